use bip39::Mnemonic;
use rand::{rngs::OsRng, RngCore};
use serde::Serialize;
use zeroize::Zeroizing;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MnemonicStrength {
    Words12,
    Words15,
    Words18,
    Words21,
    #[default]
    Words24,
}

impl MnemonicStrength {
    fn to_entropy_bits(self) -> usize {
        match self {
            MnemonicStrength::Words12 => 128,
            MnemonicStrength::Words15 => 160,
            MnemonicStrength::Words18 => 192,
            MnemonicStrength::Words21 => 224,
            MnemonicStrength::Words24 => 256,
        }
    }

    pub fn word_count(self) -> usize {
        // one word per 11 bits of entropy plus checksum
        self.to_entropy_bits() * 3 / 32
    }
}

/// Source of the random bytes a mnemonic is built from.
pub trait EntropySource: Send + Sync {
    fn fill(&self, dest: &mut [u8]) -> std::result::Result<(), rand::Error>;
}

impl EntropySource for OsRng {
    fn fill(&self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
        OsRng.try_fill_bytes(dest)
    }
}

/// A fresh mnemonic and the hex seed it stretches to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedMnemonic {
    #[serde(rename = "BIP39Mnemonic")]
    pub mnemonic: String,
    #[serde(rename = "BIP39Seed")]
    pub seed_hex: String,
}

pub struct MnemonicGenerator<E = OsRng> {
    entropy: E,
    strength: MnemonicStrength,
}

impl Default for MnemonicGenerator<OsRng> {
    fn default() -> Self {
        Self::new(OsRng, MnemonicStrength::Words24)
    }
}

impl<E: EntropySource> MnemonicGenerator<E> {
    pub fn new(entropy: E, strength: MnemonicStrength) -> Self {
        Self { entropy, strength }
    }

    pub fn strength(&self) -> MnemonicStrength {
        self.strength
    }

    pub fn generate(&self, passphrase: &str) -> Result<GeneratedMnemonic> {
        let mut entropy = Zeroizing::new(vec![0u8; self.strength.to_entropy_bits() / 8]);
        self.entropy
            .fill(&mut entropy)
            .map_err(|e| Error::EntropyUnavailable(e.to_string()))?;

        let mnemonic = Mnemonic::from_entropy(&entropy)
            .map_err(|e| Error::EntropyUnavailable(e.to_string()))?;
        let seed = Zeroizing::new(mnemonic.to_seed(passphrase));

        Ok(GeneratedMnemonic {
            mnemonic: mnemonic.to_string(),
            seed_hex: hex::encode(&seed[..]),
        })
    }
}

/// Recomputes the 64-byte seed of an existing phrase.
pub fn seed_from_phrase(phrase: &str, passphrase: &str) -> Result<Zeroizing<[u8; 64]>> {
    let mnemonic = Mnemonic::parse(phrase).map_err(|e| Error::InvalidMnemonic(e.to_string()))?;
    Ok(Zeroizing::new(mnemonic.to_seed(passphrase)))
}
