//! WIF and address encodings for a single secp256k1 key.

use bech32::{u5, ToBase32, Variant};
use bitcoin_hashes::{hash160, Hash};
use secp256k1::{PublicKey, SecretKey, SECP256K1};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::network::Network;

const COMPRESSED_FLAG: u8 = 0x01;
const WITNESS_V0: u8 = 0x00;
const OP_0: u8 = 0x00;
const PUSH_20: u8 = 0x14;

/// The four encodings of one key. All of them derive from the same
/// compressed public key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressSet {
    #[serde(rename = "WIF")]
    pub wif: String,
    #[serde(rename = "p2pkhAddress")]
    pub p2pkh: String,
    #[serde(rename = "segwitBech32")]
    pub segwit_bech32: String,
    #[serde(rename = "segwitNested")]
    pub segwit_nested: String,
}

/// A private key recovered from Wallet Import Format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedWif {
    pub secret_key: SecretKey,
    pub network: Network,
    pub compressed: bool,
}

impl DecodedWif {
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_secret_key(SECP256K1, &self.secret_key)
    }
}

/// Decodes a WIF string of either network. Returns `None` on a bad
/// checksum, unknown version byte, wrong length or out-of-range key.
pub fn decode_wif(wif: &str) -> Option<DecodedWif> {
    let payload = bs58::decode(wif.trim()).with_check(None).into_vec().ok()?;
    let (compressed, key_bytes) = match payload.len() {
        33 => (false, &payload[1..33]),
        34 if payload[33] == COMPRESSED_FLAG => (true, &payload[1..33]),
        _ => return None,
    };
    let network = Network::from_wif_prefix(payload[0])?;
    let secret_key = SecretKey::from_slice(key_bytes).ok()?;

    Some(DecodedWif {
        secret_key,
        network,
        compressed,
    })
}

pub(crate) fn hash160(data: &[u8]) -> [u8; 20] {
    hash160::Hash::hash(data).to_byte_array()
}

/// Base58Check of `version || hash`
pub(crate) fn base58_address(version: u8, hash: &[u8; 20]) -> String {
    let mut address_bytes = Vec::with_capacity(21);
    address_bytes.push(version);
    address_bytes.extend_from_slice(hash);
    bs58::encode(address_bytes).with_check().into_string()
}

/// Produces WIF, P2PKH, P2WPKH and P2SH-P2WPKH encodings on one network.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddressEncoder {
    network: Network,
}

impl AddressEncoder {
    pub fn new(network: Network) -> Self {
        Self { network }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Encodes a raw 32-byte private key. Either every encoding succeeds
    /// or the whole call fails with `AddressEncodingFailed`.
    pub fn encode(&self, private_key: &[u8]) -> Result<AddressSet> {
        let secret_key = SecretKey::from_slice(private_key)
            .map_err(|e| Error::AddressEncodingFailed(format!("invalid private key: {}", e)))?;
        let public_key = PublicKey::from_secret_key(SECP256K1, &secret_key).serialize();
        let pubkey_hash = hash160(&public_key);

        Ok(AddressSet {
            wif: self.wif(&secret_key),
            p2pkh: base58_address(self.network.p2pkh_prefix(), &pubkey_hash),
            segwit_bech32: self.p2wpkh(&pubkey_hash)?,
            segwit_nested: self.p2sh_p2wpkh(&pubkey_hash),
        })
    }

    /// WIF with the compressed-public-key flag set
    pub fn wif(&self, secret_key: &SecretKey) -> String {
        let mut data = Vec::with_capacity(34);
        data.push(self.network.wif_prefix());
        data.extend_from_slice(&secret_key.secret_bytes());
        data.push(COMPRESSED_FLAG);
        bs58::encode(data).with_check().into_string()
    }

    fn p2wpkh(&self, pubkey_hash: &[u8; 20]) -> Result<String> {
        let version = u5::try_from_u8(WITNESS_V0)
            .map_err(|e| Error::AddressEncodingFailed(e.to_string()))?;
        let mut data = vec![version];
        data.extend(pubkey_hash.to_base32());

        bech32::encode(self.network.bech32_hrp(), data, Variant::Bech32)
            .map_err(|e| Error::AddressEncodingFailed(e.to_string()))
    }

    fn p2sh_p2wpkh(&self, pubkey_hash: &[u8; 20]) -> String {
        // OP_0 PUSH(20) <pubkey_hash>
        let mut witness_script = Vec::with_capacity(22);
        witness_script.push(OP_0);
        witness_script.push(PUSH_20);
        witness_script.extend_from_slice(pubkey_hash);

        base58_address(self.network.p2sh_prefix(), &hash160(&witness_script))
    }
}
