//! The three wallet operations, wired from components built once.

use rand::rngs::OsRng;
use serde::Serialize;
use zeroize::Zeroizing;

use crate::address::{AddressEncoder, AddressSet};
use crate::config::Config;
use crate::derivation::KeyDeriver;
use crate::error::{Error, Result};
use crate::mnemonic::{EntropySource, GeneratedMnemonic, MnemonicGenerator, MnemonicStrength};
use crate::multisig::{MultisigAddress, MultisigBuilder};
use crate::path::PathParser;

/// Everything derived for one (seed, path) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HdWallet {
    #[serde(rename = "bip32ExtendedPrivateKey")]
    pub extended_private_key: String,
    #[serde(rename = "bip32ExtendedPublicKey")]
    pub extended_public_key: String,
    #[serde(rename = "bip32RootKey")]
    pub root_key: String,
    #[serde(flatten)]
    pub addresses: AddressSet,
}

pub struct WalletService<E = OsRng> {
    paths: PathParser,
    deriver: KeyDeriver,
    encoder: AddressEncoder,
    multisig: MultisigBuilder,
    mnemonics: MnemonicGenerator<E>,
}

impl WalletService<OsRng> {
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            PathParser::new(config.path.purpose),
            KeyDeriver::new(config.network),
            AddressEncoder::new(config.network),
            MultisigBuilder::new(config.network, config.multisig.policy),
            MnemonicGenerator::new(OsRng, MnemonicStrength::Words24),
        )
    }
}

impl<E: EntropySource> WalletService<E> {
    pub fn new(
        paths: PathParser,
        deriver: KeyDeriver,
        encoder: AddressEncoder,
        multisig: MultisigBuilder,
        mnemonics: MnemonicGenerator<E>,
    ) -> Self {
        Self {
            paths,
            deriver,
            encoder,
            multisig,
            mnemonics,
        }
    }

    pub fn generate_mnemonic(&self, passphrase: &str) -> Result<GeneratedMnemonic> {
        self.mnemonics.generate(passphrase)
    }

    pub fn generate_hd_wallet(&self, seed_hex: &str, path: &str) -> Result<HdWallet> {
        let seed = Zeroizing::new(
            hex::decode(seed_hex.trim()).map_err(|e| Error::InvalidSeed(e.to_string()))?,
        );
        let root = self.deriver.derive_master(&seed)?;
        let path = self.paths.parse(path)?;
        let (private, public) = self.deriver.derive_child(&root, &path)?;

        let private_key = Zeroizing::new(
            private
                .private_key_bytes()
                .ok_or_else(|| Error::AddressEncodingFailed("derived key has no secret".to_string()))?,
        );
        let addresses = self.encoder.encode(&private_key[..])?;

        Ok(HdWallet {
            extended_private_key: private.to_string(),
            extended_public_key: public.to_string(),
            root_key: root.to_string(),
            addresses,
        })
    }

    pub fn generate_multisig<S: AsRef<str>>(
        &self,
        m: i64,
        n: i64,
        wifs: &[S],
    ) -> Result<MultisigAddress> {
        self.multisig.build(m, n, wifs)
    }
}
