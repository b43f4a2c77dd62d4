//! Error types for derivation, encoding and multisig construction.

use thiserror::Error;

use crate::path::{Hardening, PathSegment};

/// Every failure a keysmith operation can report.
///
/// Operations stop at the first error; nothing partial is ever returned
/// alongside one.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid derivation path: {reason}")]
    InvalidPathFormat { reason: String },

    #[error("invalid {segment} index {value:?}")]
    InvalidIndex { segment: PathSegment, value: String },

    #[error("{segment} index {value:?} {expected}")]
    InvalidHardening {
        segment: PathSegment,
        value: String,
        expected: Hardening,
    },

    #[error("change index must be 0 or 1, got {0}")]
    InvalidChangeValue(u32),

    #[error("purpose must be 44', got {0:?}")]
    UnsupportedPurpose(String),

    #[error("invalid seed: {0}")]
    InvalidSeed(String),

    #[error("child derivation failed at depth {depth} (index {index})")]
    ChildDerivationFailed { depth: u8, index: u32 },

    #[error("address encoding failed: {0}")]
    AddressEncodingFailed(String),

    #[error("invalid WIF at position {position}")]
    InvalidWif { position: usize },

    #[error("{field} = {value} is outside {min}..={max}")]
    ThresholdOutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("expected {expected} public keys, got {actual}")]
    KeyCountMismatch { expected: usize, actual: usize },

    #[error("redeem script is {0} bytes, above the script size limit")]
    ScriptBuildFailed(usize),

    #[error("entropy source unavailable: {0}")]
    EntropyUnavailable(String),

    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),
}

impl Error {
    /// True for errors caused by the caller's input rather than by a
    /// primitive rejecting otherwise well-formed material.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Error::InvalidPathFormat { .. }
                | Error::InvalidIndex { .. }
                | Error::InvalidHardening { .. }
                | Error::InvalidChangeValue(_)
                | Error::UnsupportedPurpose(_)
                | Error::InvalidSeed(_)
                | Error::InvalidWif { .. }
                | Error::ThresholdOutOfRange { .. }
                | Error::KeyCountMismatch { .. }
                | Error::InvalidMnemonic(_)
        )
    }
}

/// Result type for keysmith operations
pub type Result<T> = std::result::Result<T, Error>;
