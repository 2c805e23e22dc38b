use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::pair::TradingPair;

/// A price observation for a trading pair.
///
/// Only produced by a successful fetch, so every field is populated.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// The pair this price is for
    pub pair: TradingPair,

    /// Price of one unit of base, in quote currency
    pub price: Decimal,

    /// When the price was received
    pub observed_at: DateTime<Utc>,

    /// Provider that served the price (COINBASE, BINANCE, etc.)
    pub source: String,
}

impl Quote {
    /// Price shown by consumers when no quote is available.
    pub const NO_PRICE: Decimal = Decimal::NEGATIVE_ONE;

    pub fn new(pair: TradingPair, price: Decimal, source: impl Into<String>) -> Self {
        Self {
            pair,
            price,
            observed_at: Utc::now(),
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quote_new() {
        let pair: TradingPair = "BTC-USD".parse().unwrap();
        let quote = Quote::new(pair.clone(), dec!(27450.12), "COINBASE");
        assert_eq!(quote.pair, pair);
        assert_eq!(quote.price, dec!(27450.12));
        assert_eq!(quote.source, "COINBASE");
    }

    #[test]
    fn test_no_price_sentinel() {
        assert_eq!(Quote::NO_PRICE, dec!(-1));
    }
}
