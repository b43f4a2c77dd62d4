use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Bitcoin network whose version bytes are used for every encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Bitcoin,
    Testnet,
}

impl Network {
    pub fn wif_prefix(self) -> u8 {
        match self {
            Network::Bitcoin => 0x80,
            Network::Testnet => 0xEF,
        }
    }

    pub fn p2pkh_prefix(self) -> u8 {
        match self {
            Network::Bitcoin => 0x00,
            Network::Testnet => 0x6F,
        }
    }

    pub fn p2sh_prefix(self) -> u8 {
        match self {
            Network::Bitcoin => 0x05,
            Network::Testnet => 0xC4,
        }
    }

    /// Human-readable part for segwit addresses
    pub fn bech32_hrp(self) -> &'static str {
        match self {
            Network::Bitcoin => "bc",
            Network::Testnet => "tb",
        }
    }

    /// BIP32 version bytes for extended private keys (xprv / tprv)
    pub fn xprv_version(self) -> [u8; 4] {
        match self {
            Network::Bitcoin => [0x04, 0x88, 0xAD, 0xE4],
            Network::Testnet => [0x04, 0x35, 0x83, 0x94],
        }
    }

    /// BIP32 version bytes for extended public keys (xpub / tpub)
    pub fn xpub_version(self) -> [u8; 4] {
        match self {
            Network::Bitcoin => [0x04, 0x88, 0xB2, 0x1E],
            Network::Testnet => [0x04, 0x35, 0x87, 0xCF],
        }
    }

    /// Network a WIF version byte belongs to, if any.
    pub fn from_wif_prefix(prefix: u8) -> Option<Self> {
        [Network::Bitcoin, Network::Testnet]
            .into_iter()
            .find(|network| network.wif_prefix() == prefix)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Network::Bitcoin => f.write_str("bitcoin"),
            Network::Testnet => f.write_str("testnet"),
        }
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bitcoin" | "mainnet" => Ok(Network::Bitcoin),
            "testnet" => Ok(Network::Testnet),
            other => Err(format!("unknown network {:?}", other)),
        }
    }
}
