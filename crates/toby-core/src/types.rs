//! Core type definitions for Toby Swapper

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Supported chain. Only Base mainnet has a token registry and router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Chain {
    Base,
}

impl Chain {
    pub fn id(&self) -> u64 {
        match self {
            Self::Base => 8453,
        }
    }

    pub fn from_id(id: u64) -> Option<Self> {
        match id {
            8453 => Some(Self::Base),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base => "base",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Either the chain's native currency or an ERC-20 token.
///
/// Serialized as an address string; native ETH uses the conventional
/// `0xEeee...EEeE` sentinel so it can travel through the same fields as
/// token addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Asset {
    Native,
    Token(Address),
}

impl Asset {
    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native)
    }

    /// Token address, or `None` for native ETH
    pub fn token_address(&self) -> Option<Address> {
        match self {
            Self::Native => None,
            Self::Token(addr) => Some(*addr),
        }
    }

    /// Address used on-chain: native ETH is replaced by `wrapped`.
    pub fn onchain_address(&self, wrapped: Address) -> Address {
        match self {
            Self::Native => wrapped,
            Self::Token(addr) => *addr,
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "{}", constants::NATIVE_SENTINEL),
            Self::Token(addr) => write!(f, "{}", addr),
        }
    }
}

impl FromStr for Asset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case(constants::NATIVE_SENTINEL)
            || trimmed.eq_ignore_ascii_case("eth")
            || trimmed.eq_ignore_ascii_case("native")
        {
            return Ok(Self::Native);
        }
        Address::from_str(trimmed)
            .map(Self::Token)
            .map_err(|e| format!("invalid address '{}': {}", trimmed, e))
    }
}

impl Serialize for Asset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Asset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Static token metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDescriptor {
    pub symbol: String,
    pub asset: Asset,
    pub decimals: u8,
}

impl TokenDescriptor {
    pub fn new(symbol: impl Into<String>, asset: Asset, decimals: u8) -> Self {
        Self {
            symbol: symbol.into(),
            asset,
            decimals,
        }
    }
}

/// Constants
pub mod constants {
    /// Sentinel address standing in for native ETH
    pub const NATIVE_SENTINEL: &str = "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE";

    /// Basis-point denominator (100%)
    pub const BPS_DENOMINATOR: u64 = 10_000;

    /// Native ETH decimals
    pub const NATIVE_DECIMALS: u8 = 18;
}

/// Parse a human decimal amount ("1.25") into smallest units.
///
/// Rejects negative values, empty input and more fractional digits than
/// `decimals` allows.
pub fn parse_amount(input: &str, decimals: u8) -> Result<U256, String> {
    let s = input.trim();
    if s.is_empty() {
        return Err("amount is empty".to_string());
    }

    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(format!("invalid amount '{}'", s));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("invalid amount '{}'", s));
    }
    if frac.len() > decimals as usize {
        return Err(format!(
            "amount '{}' has more than {} decimal places",
            s, decimals
        ));
    }

    let padded = format!("{}{:0<width$}", whole, frac, width = decimals as usize);
    let digits = padded.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 10).map_err(|e| format!("amount '{}' out of range: {}", s, e))
}

/// Format smallest units as a human decimal string with exactly `precision`
/// fractional digits (truncated, not rounded).
pub fn format_amount(value: U256, decimals: u8, precision: usize) -> String {
    let raw = value.to_string();
    let decimals = decimals as usize;

    let (whole, frac) = if raw.len() > decimals {
        let split = raw.len() - decimals;
        (raw[..split].to_string(), raw[split..].to_string())
    } else {
        ("0".to_string(), format!("{:0>width$}", raw, width = decimals))
    };

    if precision == 0 {
        return whole;
    }

    let mut frac: String = frac.chars().take(precision).collect();
    while frac.len() < precision {
        frac.push('0');
    }
    format!("{}.{}", whole, frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_ids() {
        assert_eq!(Chain::Base.id(), 8453);
        assert_eq!(Chain::from_id(8453), Some(Chain::Base));
        assert_eq!(Chain::from_id(84532), None);
        assert_eq!(Chain::from_id(1), None);
    }

    #[test]
    fn test_asset_parse_native_aliases() {
        assert_eq!("ETH".parse::<Asset>().unwrap(), Asset::Native);
        assert_eq!(
            constants::NATIVE_SENTINEL.to_lowercase().parse::<Asset>().unwrap(),
            Asset::Native
        );
        let weth: Asset = "0x4200000000000000000000000000000000000006".parse().unwrap();
        assert!(!weth.is_native());
        assert!("0x1234".parse::<Asset>().is_err());
    }

    #[test]
    fn test_asset_serde_roundtrip_uses_sentinel() {
        let json = serde_json::to_string(&Asset::Native).unwrap();
        assert_eq!(json, format!("\"{}\"", constants::NATIVE_SENTINEL));
        let back: Asset = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Asset::Native);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(
            parse_amount("1.0", 18).unwrap(),
            U256::from(1_000_000_000_000_000_000u64)
        );
        assert_eq!(parse_amount("0.5", 6).unwrap(), U256::from(500_000u64));
        assert_eq!(parse_amount(".25", 2).unwrap(), U256::from(25u64));
        assert_eq!(parse_amount("0", 18).unwrap(), U256::ZERO);
        assert!(parse_amount("1.1234567", 6).is_err());
        assert!(parse_amount("-1", 6).is_err());
        assert!(parse_amount("", 6).is_err());
        assert!(parse_amount(".", 6).is_err());
        assert!(parse_amount("1e5", 6).is_err());
    }

    #[test]
    fn test_format_amount() {
        let half_milli_eth = U256::from(500_000_000_000_000u64);
        assert_eq!(format_amount(half_milli_eth, 18, 6), "0.000500");
        assert_eq!(format_amount(U256::from(1_234_567u64), 6, 2), "1.23");
        assert_eq!(format_amount(U256::from(42u64), 0, 3), "42.000");
        assert_eq!(format_amount(U256::from(5u64), 3, 0), "0");
    }
}
