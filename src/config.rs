//! TOML configuration. Every field has a default, so an empty file (or no
//! file at all) yields a mainnet service listening on port 8080.

use std::net::SocketAddr;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::multisig::MultisigPolicy;
use crate::network::Network;
use crate::path::PurposePolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub network: Network,
    pub server: ServerConfig,
    pub path: PathConfig,
    pub multisig: MultisigConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathConfig {
    pub purpose: PurposePolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MultisigConfig {
    pub policy: MultisigPolicy,
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn empty_config_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
        assert_eq!(Config::default().network, Network::Bitcoin);
        assert_eq!(Config::default().server.listen.port(), 8080);
    }

    #[test]
    fn parses_every_section() {
        let config = Config::from_toml(
            r#"
            network = "testnet"

            [server]
            listen = "127.0.0.1:3000"

            [path]
            purpose = "bip44-only"

            [multisig]
            policy = "permissive"
            "#,
        )
        .unwrap();

        assert_eq!(config.network, Network::Testnet);
        assert_eq!(config.server.listen, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(config.path.purpose, PurposePolicy::Bip44Only);
        assert_eq!(config.multisig.policy, MultisigPolicy::Permissive);
    }

    #[test]
    fn rejects_unknown_values() {
        assert!(Config::from_toml("network = \"regtest\"").is_err());
        assert!(Config::from_toml("[multisig]\npolicy = \"loose\"").is_err());
        assert!(Config::from_toml("port = 80").is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nlisten = \"127.0.0.1:9999\"").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.listen.port(), 9999);

        assert!(matches!(
            Config::load("/nonexistent/keysmith.toml"),
            Err(ConfigError::Io { .. })
        ));
    }
}
