use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::types::Symbol;
use crate::errors::MarketDataError;

/// A trading pair such as `BTC-USD`.
///
/// Both legs are stored uppercase, so equality and hashing agree with the
/// canonical `BASE-QUOTE` string regardless of how the pair was spelled on
/// input.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TradingPair {
    base: Symbol,
    quote: Symbol,
}

impl TradingPair {
    /// Build a pair from its two legs. Legs must be non-empty ASCII alphanumerics.
    pub fn new(base: &str, quote: &str) -> Result<Self, MarketDataError> {
        let base = normalize_leg(base)
            .ok_or_else(|| MarketDataError::InvalidPair(format!("{}-{}", base, quote)))?;
        let quote = normalize_leg(quote)
            .ok_or_else(|| MarketDataError::InvalidPair(format!("{}-{}", base, quote)))?;

        Ok(Self {
            base: Arc::from(base),
            quote: Arc::from(quote),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn quote(&self) -> &str {
        &self.quote
    }

    /// Canonical `BASE-QUOTE` identity used for validation and caching.
    pub fn canonical(&self) -> String {
        format!("{}-{}", self.base, self.quote)
    }

    /// Same base, different quote currency.
    pub fn with_quote(&self, quote: &str) -> Result<Self, MarketDataError> {
        Self::new(&self.base, quote)
    }
}

fn normalize_leg(leg: &str) -> Option<String> {
    let leg = leg.trim();
    if leg.is_empty() || !leg.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(leg.to_ascii_uppercase())
}

impl FromStr for TradingPair {
    type Err = MarketDataError;

    /// Parses `BTC-USD`, `btc-usd` or `BTC/USD`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (base, quote) = s
            .split_once(['-', '/'])
            .ok_or_else(|| MarketDataError::InvalidPair(s.to_string()))?;
        Self::new(base, quote).map_err(|_| MarketDataError::InvalidPair(s.to_string()))
    }
}

impl TryFrom<String> for TradingPair {
    type Error = MarketDataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TradingPair> for String {
    fn from(pair: TradingPair) -> Self {
        pair.canonical()
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.base, self.quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_parse_canonicalizes_case() {
        let pair: TradingPair = "btc-usd".parse().unwrap();
        assert_eq!(pair.base(), "BTC");
        assert_eq!(pair.quote(), "USD");
        assert_eq!(pair.canonical(), "BTC-USD");
    }

    #[test]
    fn test_parse_slash_separator() {
        let pair: TradingPair = "eth/eur".parse().unwrap();
        assert_eq!(pair.to_string(), "ETH-EUR");
    }

    #[test]
    fn test_equality_ignores_input_case() {
        let a: TradingPair = "Sol-Usd".parse().unwrap();
        let b = TradingPair::new("SOL", "usd").unwrap();
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_rejects_malformed_pairs() {
        assert!("BTCUSD".parse::<TradingPair>().is_err());
        assert!("-USD".parse::<TradingPair>().is_err());
        assert!("BTC-".parse::<TradingPair>().is_err());
        assert!("BTC-U$D".parse::<TradingPair>().is_err());
        assert!("BTC-USD-EUR".parse::<TradingPair>().is_err());
    }

    #[test]
    fn test_with_quote() {
        let pair: TradingPair = "BTC-USD".parse().unwrap();
        let usdt = pair.with_quote("usdt").unwrap();
        assert_eq!(usdt.canonical(), "BTC-USDT");
    }

    #[test]
    fn test_serde_uses_canonical_string() {
        let pair: TradingPair = "btc-usd".parse().unwrap();
        let json = serde_json::to_string(&pair).unwrap();
        assert_eq!(json, "\"BTC-USD\"");

        let back: TradingPair = serde_json::from_str("\"eth-usd\"").unwrap();
        assert_eq!(back.canonical(), "ETH-USD");
    }
}
