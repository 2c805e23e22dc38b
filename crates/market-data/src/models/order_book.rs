use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::pair::TradingPair;

/// One aggregated price level of an order book.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BookLevel {
    pub price: Decimal,
    pub quantity: Decimal,
}

impl BookLevel {
    pub fn new(price: Decimal, quantity: Decimal) -> Self {
        Self { price, quantity }
    }
}

/// Level-2 order book for a pair as returned by one provider.
///
/// Bids and asks keep the provider's order (best price first). Books from
/// different providers are never merged.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBookSnapshot {
    pub pair: TradingPair,
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
    pub observed_at: DateTime<Utc>,
    pub source: String,
}

impl OrderBookSnapshot {
    pub fn new(
        pair: TradingPair,
        bids: Vec<BookLevel>,
        asks: Vec<BookLevel>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            pair,
            bids,
            asks,
            observed_at: Utc::now(),
            source: source.into(),
        }
    }

    /// The "no data" book shown by consumers when nothing has been fetched.
    pub fn empty(pair: TradingPair) -> Self {
        Self::new(pair, Vec::new(), Vec::new(), "")
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    pub fn best_bid(&self) -> Option<&BookLevel> {
        self.bids.first()
    }

    pub fn best_ask(&self) -> Option<&BookLevel> {
        self.asks.first()
    }

    /// Best ask minus best bid. `None` for a one-sided book or on overflow.
    pub fn spread(&self) -> Option<Decimal> {
        self.best_ask()?.price.checked_sub(self.best_bid()?.price)
    }

    pub fn mid_price(&self) -> Option<Decimal> {
        self.best_ask()?
            .price
            .checked_add(self.best_bid()?.price)?
            .checked_div(Decimal::TWO)
    }
}
