//! BIP44 derivation path parsing and validation.
//!
//! Format: `m / purpose' / coin_type' / account' / change / address_index`

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Offset added to an index to mark it hardened.
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// Position of an index within a BIP44 path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment {
    Purpose,
    CoinType,
    Account,
    Change,
    AddressIndex,
}

impl PathSegment {
    const ORDER: [PathSegment; 5] = [
        PathSegment::Purpose,
        PathSegment::CoinType,
        PathSegment::Account,
        PathSegment::Change,
        PathSegment::AddressIndex,
    ];

    /// Hardening this segment must carry, or `None` when either is accepted.
    fn required_hardening(self) -> Option<Hardening> {
        match self {
            PathSegment::Purpose => None,
            PathSegment::CoinType | PathSegment::Account => Some(Hardening::Hardened),
            PathSegment::Change | PathSegment::AddressIndex => Some(Hardening::Normal),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            PathSegment::Purpose => "purpose",
            PathSegment::CoinType => "coin type",
            PathSegment::Account => "account",
            PathSegment::Change => "change",
            PathSegment::AddressIndex => "address index",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hardening {
    Hardened,
    Normal,
}

impl fmt::Display for Hardening {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Hardening::Hardened => f.write_str("must be hardened"),
            Hardening::Normal => f.write_str("must not be hardened"),
        }
    }
}

/// Which purpose values the parser accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PurposePolicy {
    /// Any purpose, hardened or not.
    #[default]
    Any,
    /// Only `44'`.
    Bip44Only,
}

/// A validated five-level path. Indices are stored already encoded, so
/// hardened levels include [`HARDENED_OFFSET`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivationPath {
    pub purpose: u32,
    pub coin_type: u32,
    pub account: u32,
    pub change: u32,
    pub address_index: u32,
}

impl DerivationPath {
    /// Indices in derivation order.
    pub fn indices(&self) -> [u32; 5] {
        [
            self.purpose,
            self.coin_type,
            self.account,
            self.change,
            self.address_index,
        ]
    }

    /// BIP44 - Multi-Account Hierarchy for Deterministic Wallets
    pub fn bip44(coin_type: u32, account: u32, change: bool, address_index: u32) -> Result<Self> {
        Self::standard(44, coin_type, account, change, address_index)
    }

    /// BIP49 - P2WPKH nested in P2SH
    pub fn bip49(coin_type: u32, account: u32, change: bool, address_index: u32) -> Result<Self> {
        Self::standard(49, coin_type, account, change, address_index)
    }

    /// BIP84 - native P2WPKH
    pub fn bip84(coin_type: u32, account: u32, change: bool, address_index: u32) -> Result<Self> {
        Self::standard(84, coin_type, account, change, address_index)
    }

    fn standard(
        purpose: u32,
        coin_type: u32,
        account: u32,
        change: bool,
        address_index: u32,
    ) -> Result<Self> {
        let path = format!(
            "m/{}'/{}'/{}'/{}/{}",
            purpose,
            coin_type,
            account,
            if change { 1 } else { 0 },
            address_index
        );
        PathParser::default().parse(&path)
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("m")?;
        for index in self.indices() {
            if index >= HARDENED_OFFSET {
                write!(f, "/{}'", index - HARDENED_OFFSET)?;
            } else {
                write!(f, "/{}", index)?;
            }
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PathParser::default().parse(s)
    }
}

/// Parses path strings into [`DerivationPath`] under a [`PurposePolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PathParser {
    policy: PurposePolicy,
}

impl PathParser {
    pub fn new(policy: PurposePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> PurposePolicy {
        self.policy
    }

    pub fn parse(&self, path: &str) -> Result<DerivationPath> {
        let segments: Vec<&str> = path.split('/').map(str::trim).collect();

        if segments.len() != 6 {
            return Err(Error::InvalidPathFormat {
                reason: format!("expected 6 segments, got {}", segments.len()),
            });
        }
        if segments[0] != "m" {
            return Err(Error::InvalidPathFormat {
                reason: format!("path must start at the master key \"m\", got {:?}", segments[0]),
            });
        }

        let fields = &segments[1..];
        let mut indices = [0u32; 5];
        for ((slot, segment), raw) in indices.iter_mut().zip(PathSegment::ORDER).zip(fields) {
            *slot = parse_index(segment, raw)?;
        }

        for (segment, raw) in PathSegment::ORDER.into_iter().zip(fields) {
            let Some(expected) = segment.required_hardening() else {
                continue;
            };
            if is_hardened(raw) != (expected == Hardening::Hardened) {
                return Err(Error::InvalidHardening {
                    segment,
                    value: raw.to_string(),
                    expected,
                });
            }
        }

        let [purpose, coin_type, account, change, address_index] = indices;

        if change > 1 {
            return Err(Error::InvalidChangeValue(change));
        }
        if self.policy == PurposePolicy::Bip44Only && purpose != 44 + HARDENED_OFFSET {
            return Err(Error::UnsupportedPurpose(fields[0].to_string()));
        }

        Ok(DerivationPath {
            purpose,
            coin_type,
            account,
            change,
            address_index,
        })
    }
}

fn is_hardened(field: &str) -> bool {
    field.ends_with('\'')
}

fn parse_index(segment: PathSegment, field: &str) -> Result<u32> {
    let invalid = || Error::InvalidIndex {
        segment,
        value: field.to_string(),
    };

    let digits = field.strip_suffix('\'').unwrap_or(field);
    // u32 parsing rejects "-1" and "" as well as non-digits.
    let index: u32 = digits.parse().map_err(|_| invalid())?;
    if index >= HARDENED_OFFSET {
        return Err(invalid());
    }

    if is_hardened(field) {
        Ok(index + HARDENED_OFFSET)
    } else {
        Ok(index)
    }
}
