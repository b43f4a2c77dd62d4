pub mod address;
pub mod config;
pub mod derivation;
pub mod error;
pub mod mnemonic;
pub mod multisig;
pub mod network;
pub mod path;
pub mod server;
pub mod service;

pub use address::{decode_wif, AddressEncoder, AddressSet, DecodedWif};
pub use config::{Config, ConfigError};
pub use derivation::{DerivedKeys, ExtendedKey, KeyDeriver, KeyMaterial};
pub use error::{Error, Result};
pub use mnemonic::{
    seed_from_phrase, EntropySource, GeneratedMnemonic, MnemonicGenerator, MnemonicStrength,
};
pub use multisig::{MultisigAddress, MultisigBuilder, MultisigPolicy};
pub use network::Network;
pub use path::{DerivationPath, PathParser, PurposePolicy, HARDENED_OFFSET};
pub use service::{HdWallet, WalletService};
