//! M-of-N P2SH multisig redeem scripts.

use secp256k1::PublicKey;
use serde::{Deserialize, Serialize};

use crate::address::{base58_address, decode_wif, hash160};
use crate::error::{Error, Result};
use crate::network::Network;

const OP_1: u8 = 0x51;
const OP_CHECKMULTISIG: u8 = 0xae;
const MIN_KEYS: i64 = 1;
const MAX_KEYS: i64 = 16;
/// Consensus limit on script length
const MAX_SCRIPT_SIZE: usize = 10_000;

/// How much of the M-of-N shape is checked beyond the opcode range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultisigPolicy {
    /// Also require `m <= n` and exactly `n` keys.
    #[default]
    Strict,
    /// Only require `m` and `n` in `1..=16`.
    Permissive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultisigAddress {
    pub address: String,
    #[serde(rename = "redeemScript", serialize_with = "hex::serde::serialize")]
    pub redeem_script: Vec<u8>,
}

/// Maps 1..=16 to OP_1..OP_16.
pub fn small_int_opcode(field: &'static str, value: i64) -> Result<u8> {
    if !(MIN_KEYS..=MAX_KEYS).contains(&value) {
        return Err(Error::ThresholdOutOfRange {
            field,
            value,
            min: MIN_KEYS,
            max: MAX_KEYS,
        });
    }
    Ok(OP_1 + (value - 1) as u8)
}

/// Recovers compressed public keys from WIF strings, in order.
pub fn public_keys_from_wifs<S: AsRef<str>>(wifs: &[S]) -> Result<Vec<PublicKey>> {
    wifs.iter()
        .enumerate()
        .map(|(position, wif)| {
            decode_wif(wif.as_ref())
                .map(|decoded| decoded.public_key())
                .ok_or(Error::InvalidWif { position })
        })
        .collect()
}

/// `OP_m <pubkey>... OP_n OP_CHECKMULTISIG`
pub fn redeem_script(m_opcode: u8, n_opcode: u8, public_keys: &[PublicKey]) -> Result<Vec<u8>> {
    let mut script = Vec::with_capacity(3 + public_keys.len() * 34);
    script.push(m_opcode);
    for key in public_keys {
        let serialized = key.serialize();
        // 33-byte pushes fit in a direct push opcode
        script.push(serialized.len() as u8);
        script.extend_from_slice(&serialized);
    }
    script.push(n_opcode);
    script.push(OP_CHECKMULTISIG);

    if script.len() > MAX_SCRIPT_SIZE {
        return Err(Error::ScriptBuildFailed(script.len()));
    }
    Ok(script)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MultisigBuilder {
    network: Network,
    policy: MultisigPolicy,
}

impl MultisigBuilder {
    pub fn new(network: Network, policy: MultisigPolicy) -> Self {
        Self { network, policy }
    }

    pub fn policy(&self) -> MultisigPolicy {
        self.policy
    }

    /// Builds the redeem script for `m` of the keys behind `wifs` and its
    /// P2SH address. Key order is preserved: reordering changes the address.
    pub fn build<S: AsRef<str>>(&self, m: i64, n: i64, wifs: &[S]) -> Result<MultisigAddress> {
        let m_opcode = small_int_opcode("m", m)?;
        let n_opcode = small_int_opcode("n", n)?;

        if self.policy == MultisigPolicy::Strict {
            if m > n {
                return Err(Error::ThresholdOutOfRange {
                    field: "m",
                    value: m,
                    min: MIN_KEYS,
                    max: n,
                });
            }
            if wifs.len() as i64 != n {
                return Err(Error::KeyCountMismatch {
                    expected: n as usize,
                    actual: wifs.len(),
                });
            }
        }

        let public_keys = public_keys_from_wifs(wifs)?;
        let redeem_script = redeem_script(m_opcode, n_opcode, &public_keys)?;
        let address = base58_address(self.network.p2sh_prefix(), &hash160(&redeem_script));

        Ok(MultisigAddress {
            address,
            redeem_script,
        })
    }

    pub fn build_address<S: AsRef<str>>(&self, m: i64, n: i64, wifs: &[S]) -> Result<String> {
        self.build(m, n, wifs).map(|multisig| multisig.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIFS: [&str; 2] = [
        "cQpHXfs91s5eR9PWXui6qo2xjoJb2X3VdUspwKXe4A8Dybvut2rL",
        "cVgxEkRBtnfvd41ssd4PCsiemahAHidFrLWYoDBMNojUeME8dojZ",
    ];

    #[test]
    fn opcodes_cover_one_to_sixteen() {
        assert_eq!(small_int_opcode("n", 1).unwrap(), 0x51);
        assert_eq!(small_int_opcode("n", 2).unwrap(), 0x52);
        assert_eq!(small_int_opcode("n", 16).unwrap(), 0x60);
        for value in [0, 17, -1, i64::MAX] {
            assert!(matches!(
                small_int_opcode("n", value),
                Err(Error::ThresholdOutOfRange { value: v, .. }) if v == value
            ));
        }
    }

    #[test]
    fn one_of_two() {
        let multisig = MultisigBuilder::default().build(1, 2, &WIFS).unwrap();
        assert_eq!(multisig.address, "3MHoRjzuFaaVHAXqzXXpm1LtpYKq2YwUXk");
        assert_eq!(multisig.redeem_script.len(), 3 + 2 * 34);
        assert_eq!(multisig.redeem_script[0], 0x51);
        assert_eq!(multisig.redeem_script[multisig.redeem_script.len() - 2], 0x52);
        assert_eq!(*multisig.redeem_script.last().unwrap(), OP_CHECKMULTISIG);
    }

    #[test]
    fn permissive_policy_keeps_legacy_script_shape() {
        // OP_2 <k1> <k2> OP_1 OP_CHECKMULTISIG
        let builder = MultisigBuilder::new(Network::Bitcoin, MultisigPolicy::Permissive);
        assert_eq!(
            builder.build_address(2, 1, &WIFS).unwrap(),
            "3MqSiHLbK6M8YUL8sXKiULeiRSvckJV74h"
        );
    }

    #[test]
    fn strict_policy_checks_shape() {
        let builder = MultisigBuilder::default();
        assert!(matches!(
            builder.build(2, 1, &WIFS),
            Err(Error::ThresholdOutOfRange { field: "m", value: 2, .. })
        ));
        assert_eq!(
            builder.build(1, 3, &WIFS).unwrap_err(),
            Error::KeyCountMismatch {
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn key_order_changes_address() {
        let builder = MultisigBuilder::default();
        let reversed = [WIFS[1], WIFS[0]];
        assert_ne!(
            builder.build_address(1, 2, &WIFS).unwrap(),
            builder.build_address(1, 2, &reversed).unwrap()
        );
    }

    #[test]
    fn reports_first_invalid_wif() {
        let wifs = [WIFS[0], "garbage", "more garbage"];
        assert_eq!(
            MultisigBuilder::default().build(1, 3, &wifs).unwrap_err(),
            Error::InvalidWif { position: 1 }
        );
    }

    #[test]
    fn thresholds_are_checked_before_keys() {
        let wifs = ["garbage"];
        assert!(matches!(
            MultisigBuilder::default().build(0, 1, &wifs),
            Err(Error::ThresholdOutOfRange { field: "m", .. })
        ));
        assert!(matches!(
            MultisigBuilder::default().build(1, 17, &wifs),
            Err(Error::ThresholdOutOfRange { field: "n", .. })
        ));
    }

    #[test]
    fn sixteen_keys_fit() {
        let wifs = [WIFS[0]; 16];
        let multisig = MultisigBuilder::default().build(16, 16, &wifs).unwrap();
        assert_eq!(multisig.redeem_script[0], 0x60);
        assert!(multisig.address.starts_with('3'));
    }
}
