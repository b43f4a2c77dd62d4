use std::fmt;

use bitcoin_hashes::{hash160, Hash};
use hmac::{Hmac, Mac};
use secp256k1::{PublicKey, Scalar, SecretKey, SECP256K1};
use sha2::Sha512;

use crate::error::{Error, Result};
use crate::network::Network;
use crate::path::{DerivationPath, HARDENED_OFFSET};

const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";
const MIN_SEED_LEN: usize = 16;
const MAX_SEED_LEN: usize = 64;

/// Private or public half of an extended key.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum KeyMaterial {
    Private(SecretKey),
    Public(PublicKey),
}

impl KeyMaterial {
    pub fn public_key(&self) -> PublicKey {
        match self {
            KeyMaterial::Private(secret) => PublicKey::from_secret_key(SECP256K1, secret),
            KeyMaterial::Public(public) => *public,
        }
    }
}

/// Represents a BIP32 extended key
#[derive(Clone, PartialEq, Eq)]
pub struct ExtendedKey {
    pub network: Network,
    pub key: KeyMaterial,
    pub chain_code: [u8; 32],
    pub depth: u8,
    pub parent_fingerprint: [u8; 4],
    pub child_number: u32,
}

impl ExtendedKey {
    /// Creates a new master key from a seed
    pub fn from_seed(seed: &[u8], network: Network) -> Result<Self> {
        if !(MIN_SEED_LEN..=MAX_SEED_LEN).contains(&seed.len()) {
            return Err(Error::InvalidSeed(format!(
                "seed must be {}..={} bytes, got {}",
                MIN_SEED_LEN,
                MAX_SEED_LEN,
                seed.len()
            )));
        }

        let (left, chain_code) = hmac_sha512(MASTER_HMAC_KEY, seed)?;
        let private_key = SecretKey::from_slice(&left)
            .map_err(|_| Error::InvalidSeed("seed yields an invalid master key".to_string()))?;

        Ok(ExtendedKey {
            network,
            key: KeyMaterial::Private(private_key),
            chain_code,
            depth: 0,
            parent_fingerprint: [0u8; 4],
            child_number: 0,
        })
    }

    pub fn is_private(&self) -> bool {
        matches!(self.key, KeyMaterial::Private(_))
    }

    pub fn public_key(&self) -> PublicKey {
        self.key.public_key()
    }

    /// Raw 32-byte secret, or `None` for a public extended key.
    pub fn private_key_bytes(&self) -> Option<[u8; 32]> {
        match &self.key {
            KeyMaterial::Private(secret) => Some(secret.secret_bytes()),
            KeyMaterial::Public(_) => None,
        }
    }

    /// Derives a child key based on the provided index
    pub fn derive_child(&self, index: u32) -> Result<Self> {
        let failed = || Error::ChildDerivationFailed {
            depth: self.depth.saturating_add(1),
            index,
        };
        let depth = self.depth.checked_add(1).ok_or_else(failed)?;
        let parent_public = self.public_key();

        // 33 bytes of key material + 4 bytes for index
        let mut data = Vec::with_capacity(37);
        match (&self.key, index >= HARDENED_OFFSET) {
            (KeyMaterial::Private(secret), true) => {
                data.push(0);
                data.extend_from_slice(&secret.secret_bytes());
            }
            (_, false) => data.extend_from_slice(&parent_public.serialize()),
            (KeyMaterial::Public(_), true) => return Err(failed()),
        }
        data.extend_from_slice(&index.to_be_bytes());

        let (left, chain_code) = hmac_sha512(&self.chain_code, &data)?;
        // IL >= n makes the child invalid
        let tweak = Scalar::from_be_bytes(left).map_err(|_| failed())?;

        let key = match &self.key {
            KeyMaterial::Private(secret) => {
                KeyMaterial::Private(secret.add_tweak(&tweak).map_err(|_| failed())?)
            }
            KeyMaterial::Public(public) => {
                KeyMaterial::Public(public.add_exp_tweak(SECP256K1, &tweak).map_err(|_| failed())?)
            }
        };

        Ok(ExtendedKey {
            network: self.network,
            key,
            chain_code,
            depth,
            parent_fingerprint: fingerprint_of(&parent_public),
            child_number: index,
        })
    }

    /// Calculates the fingerprint of this key
    pub fn fingerprint(&self) -> [u8; 4] {
        fingerprint_of(&self.public_key())
    }

    /// Gets the extended public key (removing private key information)
    pub fn neuter(&self) -> Self {
        ExtendedKey {
            key: KeyMaterial::Public(self.public_key()),
            ..self.clone()
        }
    }

    /// BIP32 78-byte serialization
    fn serialize(&self) -> [u8; 78] {
        let mut data = [0u8; 78];
        let version = match self.key {
            KeyMaterial::Private(_) => self.network.xprv_version(),
            KeyMaterial::Public(_) => self.network.xpub_version(),
        };
        data[0..4].copy_from_slice(&version);
        data[4] = self.depth;
        data[5..9].copy_from_slice(&self.parent_fingerprint);
        data[9..13].copy_from_slice(&self.child_number.to_be_bytes());
        data[13..45].copy_from_slice(&self.chain_code);
        match &self.key {
            // 0x00 byte + private key (33 bytes)
            KeyMaterial::Private(secret) => data[46..78].copy_from_slice(&secret.secret_bytes()),
            KeyMaterial::Public(public) => data[45..78].copy_from_slice(&public.serialize()),
        }
        data
    }
}

/// Base58Check form: xprv/xpub on mainnet, tprv/tpub on testnet.
impl fmt::Display for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&bs58::encode(self.serialize()).with_check().into_string())
    }
}

// Never print secrets through Debug
impl fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ExtendedKey")
            .field("network", &self.network)
            .field("private", &self.is_private())
            .field("depth", &self.depth)
            .field("parent_fingerprint", &hex::encode(self.parent_fingerprint))
            .field("child_number", &self.child_number)
            .finish_non_exhaustive()
    }
}

fn fingerprint_of(public_key: &PublicKey) -> [u8; 4] {
    let hash = hash160::Hash::hash(&public_key.serialize()).to_byte_array();
    let mut result = [0u8; 4];
    result.copy_from_slice(&hash[0..4]);
    result
}

fn hmac_sha512(key: &[u8], data: &[u8]) -> Result<([u8; 32], [u8; 32])> {
    let mut hmac = Hmac::<Sha512>::new_from_slice(key)
        .map_err(|_| Error::InvalidSeed("HMAC key rejected".to_string()))?;
    hmac.update(data);
    let result = hmac.finalize().into_bytes();

    let mut left = [0u8; 32];
    let mut right = [0u8; 32];
    left.copy_from_slice(&result[0..32]);
    right.copy_from_slice(&result[32..64]);
    Ok((left, right))
}

/// Extended keys at the end of a derivation path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedKeys {
    pub root: ExtendedKey,
    pub private: ExtendedKey,
    /// Neutered twin of `private`.
    pub public: ExtendedKey,
}

/// Derives the master key from a seed and walks BIP44 paths from it.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyDeriver {
    network: Network,
}

impl KeyDeriver {
    pub fn new(network: Network) -> Self {
        Self { network }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn derive_master(&self, seed: &[u8]) -> Result<ExtendedKey> {
        ExtendedKey::from_seed(seed, self.network)
    }

    /// Applies purpose, coin type, account, change and address index in
    /// order, stopping at the first failing step.
    pub fn derive_child(
        &self,
        parent: &ExtendedKey,
        path: &DerivationPath,
    ) -> Result<(ExtendedKey, ExtendedKey)> {
        let private = path
            .indices()
            .into_iter()
            .try_fold(parent.clone(), |key, index| key.derive_child(index))?;
        let public = private.neuter();
        Ok((private, public))
    }

    /// Master key plus the keys at `path`, in one call.
    pub fn derive(&self, seed: &[u8], path: &DerivationPath) -> Result<DerivedKeys> {
        let root = self.derive_master(seed)?;
        let (private, public) = self.derive_child(&root, path)?;
        Ok(DerivedKeys {
            root,
            private,
            public,
        })
    }
}
