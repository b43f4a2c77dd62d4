//! HTTP front end for the wallet operations.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::error::Error;
use crate::mnemonic::{EntropySource, GeneratedMnemonic};
use crate::multisig::MultisigAddress;
use crate::service::{HdWallet, WalletService};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MnemonicRequest {
    passphrase: String,
}

#[derive(Debug, Deserialize)]
struct HdWalletRequest {
    seed: String,
    path: String,
}

#[derive(Debug, Deserialize)]
struct MultisigRequest {
    m: i64,
    n: i64,
    wif: Vec<String>,
}

/// Failure of one operation, rendered as `{ error, reason }`.
#[derive(Debug)]
pub struct ApiError {
    operation: &'static str,
    error: Error,
}

impl ApiError {
    fn new(operation: &'static str, error: Error) -> Self {
        tracing::warn!(operation, %error, "request failed");
        Self { operation, error }
    }

    pub fn status(&self) -> StatusCode {
        match &self.error {
            Error::EntropyUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            e if e.is_invalid_input() => StatusCode::BAD_REQUEST,
            _ => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.operation,
            "reason": self.error.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}

/// Request bodies that fail to parse never reach a handler's logic.
pub struct Unprocessable;

impl IntoResponse for Unprocessable {
    fn into_response(self) -> Response {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": "Unprocessable Entity" })),
        )
            .into_response()
    }
}

impl From<JsonRejection> for Unprocessable {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!(%rejection, "rejected request body");
        Unprocessable
    }
}

impl From<serde_json::Error> for Unprocessable {
    fn from(error: serde_json::Error) -> Self {
        tracing::warn!(%error, "rejected request body");
        Unprocessable
    }
}

async fn mnemonic<E: EntropySource + 'static>(
    State(service): State<Arc<WalletService<E>>>,
    body: Bytes,
) -> Result<Json<GeneratedMnemonic>, Response> {
    // An empty body means an empty passphrase.
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        MnemonicRequest::default()
    } else {
        serde_json::from_slice::<MnemonicRequest>(&body)
            .map_err(|e| Unprocessable::from(e).into_response())?
    };

    service
        .generate_mnemonic(&request.passphrase)
        .map(Json)
        .map_err(|e| ApiError::new("failed to generate mnemonic", e).into_response())
}

async fn hd_wallet<E: EntropySource + 'static>(
    State(service): State<Arc<WalletService<E>>>,
    payload: Result<Json<HdWalletRequest>, JsonRejection>,
) -> Result<Json<HdWallet>, Response> {
    let Json(request) = payload.map_err(|e| Unprocessable::from(e).into_response())?;

    service
        .generate_hd_wallet(&request.seed, &request.path)
        .map(Json)
        .map_err(|e| ApiError::new("failed to derive hd wallet", e).into_response())
}

async fn multisig<E: EntropySource + 'static>(
    State(service): State<Arc<WalletService<E>>>,
    payload: Result<Json<MultisigRequest>, JsonRejection>,
) -> Result<Json<MultisigAddress>, Response> {
    let Json(request) = payload.map_err(|e| Unprocessable::from(e).into_response())?;

    service
        .generate_multisig(request.m, request.n, &request.wif)
        .map(Json)
        .map_err(|e| ApiError::new("failed to build multisig address", e).into_response())
}

pub fn router<E: EntropySource + 'static>(service: Arc<WalletService<E>>) -> Router {
    Router::new()
        .route("/util/mnemonic", post(mnemonic::<E>))
        .route("/util/hd-wallet", post(hd_wallet::<E>))
        .route("/util/multi-sig-p2sh", post(multisig::<E>))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

pub async fn serve<E: EntropySource + 'static>(
    addr: SocketAddr,
    service: Arc<WalletService<E>>,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router(service)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        let status = |error| ApiError::new("op", error).status();
        assert_eq!(status(Error::InvalidChangeValue(2)), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(Error::InvalidWif { position: 0 }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(Error::ChildDerivationFailed { depth: 3, index: 0 }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(Error::AddressEncodingFailed("bad key".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(Error::EntropyUnavailable("gone".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
