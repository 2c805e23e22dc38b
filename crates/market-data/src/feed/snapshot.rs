use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::errors::{ErrorKind, MarketDataError};
use crate::models::{OrderBookSnapshot, Quote, TradingPair};

/// Error attached to a published snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedError {
    pub kind: ErrorKind,
    pub provider: Option<String>,
    pub message: String,
}

impl From<&MarketDataError> for FeedError {
    fn from(error: &MarketDataError) -> Self {
        Self {
            kind: error.kind(),
            provider: error.provider().map(str::to_string),
            message: error.to_string(),
        }
    }
}

/// What a feed consumer sees.
///
/// `value` is the last successful result for `target`. A failed fetch sets
/// `error` but leaves `value` alone, so stale-but-available data stays
/// visible next to the error that made it stale.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSnapshot<T> {
    pub target: Option<TradingPair>,
    pub value: Option<T>,
    pub error: Option<FeedError>,
    pub is_loading: bool,
    pub is_polling: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> Default for FeedSnapshot<T> {
    fn default() -> Self {
        Self {
            target: None,
            value: None,
            error: None,
            is_loading: false,
            is_polling: false,
            updated_at: None,
        }
    }
}

impl<T> FeedSnapshot<T> {
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// A value is shown, but the latest fetch failed.
    pub fn is_stale(&self) -> bool {
        self.value.is_some() && self.error.is_some()
    }
}

impl FeedSnapshot<Quote> {
    /// Last price, or [`Quote::NO_PRICE`] when there is none.
    pub fn price_or_sentinel(&self) -> Decimal {
        self.value
            .as_ref()
            .map(|q| q.price)
            .unwrap_or(Quote::NO_PRICE)
    }
}

impl FeedSnapshot<OrderBookSnapshot> {
    /// Last book, or an empty one for the current target.
    ///
    /// `None` only when the feed has never been started.
    pub fn book_or_empty(&self) -> Option<OrderBookSnapshot> {
        match (&self.value, &self.target) {
            (Some(book), _) => Some(book.clone()),
            (None, Some(pair)) => Some(OrderBookSnapshot::empty(pair.clone())),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn btc_usd() -> TradingPair {
        "BTC-USD".parse().unwrap()
    }

    #[test]
    fn test_price_sentinel() {
        let mut snapshot: FeedSnapshot<Quote> = FeedSnapshot::default();
        assert_eq!(snapshot.price_or_sentinel(), dec!(-1));

        snapshot.value = Some(Quote::new(btc_usd(), dec!(27450.12), "COINBASE"));
        assert_eq!(snapshot.price_or_sentinel(), dec!(27450.12));
    }

    #[test]
    fn test_empty_book_for_target() {
        let mut snapshot: FeedSnapshot<OrderBookSnapshot> = FeedSnapshot::default();
        assert!(snapshot.book_or_empty().is_none());

        snapshot.target = Some(btc_usd());
        let book = snapshot.book_or_empty().unwrap();
        assert!(book.is_empty());
        assert_eq!(book.pair, btc_usd());
    }

    #[test]
    fn test_feed_error_from_market_data_error() {
        let error = FeedError::from(&MarketDataError::Timeout {
            provider: "BINANCE".to_string(),
        });
        assert_eq!(error.kind, ErrorKind::Transient);
        assert_eq!(error.provider.as_deref(), Some("BINANCE"));

        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["kind"], "transient");
    }
}
