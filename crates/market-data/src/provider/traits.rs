//! Market data provider trait definitions.
//!
//! This module defines the core `MarketDataProvider` trait that all
//! quote sources implement.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{DataKind, OrderBookSnapshot, Quote, TradingPair};

use super::capabilities::ProviderCapabilities;

/// Trait for market data providers.
///
/// A provider performs exactly one network round trip per call and
/// classifies the result into a [`MarketDataError`]. Retrying and falling
/// back to other providers happen in the pipeline, never here.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use pricefeed_market_data::provider::{MarketDataProvider, ProviderCapabilities};
///
/// struct MyExchange;
///
/// #[async_trait]
/// impl MarketDataProvider for MyExchange {
///     fn id(&self) -> &'static str {
///         "MY_EXCHANGE"
///     }
///
///     fn capabilities(&self) -> ProviderCapabilities {
///         ProviderCapabilities {
///             data_kinds: &[DataKind::Ticker],
///         }
///     }
///
///     async fn get_ticker(&self, pair: &TradingPair) -> Result<Quote, MarketDataError> {
///         // ... one HTTP request
///     }
/// }
/// ```
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "COINBASE", "BINANCE", etc.
    /// Used for logging, circuit breaker tracking and diagnostics.
    fn id(&self) -> &'static str;

    /// Provider priority for ordering.
    ///
    /// Lower values = higher priority. Default is 10.
    fn priority(&self) -> u8 {
        10
    }

    /// Describes which data kinds this provider serves.
    fn capabilities(&self) -> ProviderCapabilities;

    /// Fetch a reference spot price.
    async fn get_spot_price(&self, pair: &TradingPair) -> Result<Quote, MarketDataError> {
        let _ = pair;
        Err(self.not_supported(DataKind::Spot))
    }

    /// Fetch the last traded price.
    async fn get_ticker(&self, pair: &TradingPair) -> Result<Quote, MarketDataError> {
        let _ = pair;
        Err(self.not_supported(DataKind::Ticker))
    }

    /// Fetch a level-2 order book snapshot.
    async fn get_order_book(
        &self,
        pair: &TradingPair,
    ) -> Result<OrderBookSnapshot, MarketDataError> {
        let _ = pair;
        Err(self.not_supported(DataKind::OrderBook))
    }

    /// Builds the error returned by default method implementations.
    fn not_supported(&self, kind: DataKind) -> MarketDataError {
        MarketDataError::NotSupported {
            operation: kind.operation().to_string(),
            provider: self.id().to_string(),
        }
    }
}
