use crate::error::MemolessError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Source chains the deposit engine knows how to build instructions for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chain {
    Btc,
    Ltc,
    Bch,
    Doge,
    Eth,
    Avax,
    Bsc,
    Base,
    Gaia,
    Thor,
}

impl Chain {
    pub fn code(&self) -> &'static str {
        match self {
            Chain::Btc => "BTC",
            Chain::Ltc => "LTC",
            Chain::Bch => "BCH",
            Chain::Doge => "DOGE",
            Chain::Eth => "ETH",
            Chain::Avax => "AVAX",
            Chain::Bsc => "BSC",
            Chain::Base => "BASE",
            Chain::Gaia => "GAIA",
            Chain::Thor => "THOR",
        }
    }

    /// Decimal places of the chain's native asset on the wire.
    pub fn native_decimals(&self) -> u32 {
        match self {
            Chain::Btc | Chain::Ltc | Chain::Bch | Chain::Doge => 8,
            Chain::Eth | Chain::Avax | Chain::Bsc | Chain::Base => 18,
            Chain::Gaia => 6,
            Chain::Thor => 8,
        }
    }

    /// Rough average block time, used only for human-facing expiry estimates.
    pub fn average_block_time_secs(&self) -> u64 {
        match self {
            Chain::Btc => 600,
            Chain::Ltc => 150,
            Chain::Bch => 600,
            Chain::Doge => 60,
            Chain::Eth => 12,
            Chain::Avax => 2,
            Chain::Bsc => 3,
            Chain::Base => 2,
            Chain::Gaia => 6,
            Chain::Thor => 6,
        }
    }
}

impl FromStr for Chain {
    type Err = MemolessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BTC" => Ok(Chain::Btc),
            "LTC" => Ok(Chain::Ltc),
            "BCH" => Ok(Chain::Bch),
            "DOGE" => Ok(Chain::Doge),
            "ETH" => Ok(Chain::Eth),
            "AVAX" => Ok(Chain::Avax),
            "BSC" => Ok(Chain::Bsc),
            "BASE" => Ok(Chain::Base),
            "GAIA" => Ok(Chain::Gaia),
            "THOR" => Ok(Chain::Thor),
            other => Err(MemolessError::Input(format!("unknown chain: {other}"))),
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Chain-qualified asset identifier, e.g. `BTC.BTC` or `ETH.USDC-0XA0B8...`.
///
/// The symbol keeps its sub-unit marker verbatim; a `-` inside it marks a
/// token sub-asset, which the memoless flow excludes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetId {
    pub chain: Chain,
    pub symbol: String,
}

impl AssetId {
    pub fn new(chain: Chain, symbol: impl Into<String>) -> Self {
        Self {
            chain,
            symbol: symbol.into(),
        }
    }

    /// True for token sub-assets (`SYMBOL-CONTRACT`).
    pub fn is_token(&self) -> bool {
        self.symbol.contains('-')
    }

    /// Contract part of a token sub-asset, if any.
    pub fn contract(&self) -> Option<&str> {
        self.symbol.split_once('-').map(|(_, c)| c)
    }

    /// The home chain's own native asset, which cannot take this deposit path.
    pub fn is_native_rune(&self) -> bool {
        self.chain == Chain::Thor && self.symbol == "RUNE"
    }
}

impl FromStr for AssetId {
    type Err = MemolessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (chain, symbol) = s
            .split_once('.')
            .ok_or_else(|| MemolessError::Input(format!("asset missing chain separator: {s}")))?;
        if symbol.is_empty() {
            return Err(MemolessError::Input(format!("asset missing symbol: {s}")));
        }
        Ok(Self {
            chain: chain.parse()?,
            symbol: symbol.to_ascii_uppercase(),
        })
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.chain, self.symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_asset() {
        let asset: AssetId = "BTC.BTC".parse().unwrap();
        assert_eq!(asset.chain, Chain::Btc);
        assert_eq!(asset.symbol, "BTC");
        assert!(!asset.is_token());
        assert_eq!(asset.to_string(), "BTC.BTC");
    }

    #[test]
    fn test_parse_token_asset() {
        let asset: AssetId = "ETH.USDC-0XA0B86991".parse().unwrap();
        assert!(asset.is_token());
        assert_eq!(asset.contract(), Some("0XA0B86991"));
    }

    #[test]
    fn test_parse_rejects_missing_parts() {
        assert!("BTC".parse::<AssetId>().is_err());
        assert!("BTC.".parse::<AssetId>().is_err());
        assert!("XXX.FOO".parse::<AssetId>().is_err());
    }

    #[test]
    fn test_native_rune_detection() {
        let rune: AssetId = "THOR.RUNE".parse().unwrap();
        assert!(rune.is_native_rune());
        let btc: AssetId = "BTC.BTC".parse().unwrap();
        assert!(!btc.is_native_rune());
    }
}
