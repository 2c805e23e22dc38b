//! Pricefeed Market Data Crate
//!
//! This crate keeps live prices, order books and spot quotes for crypto
//! trading pairs up to date by polling public exchange APIs.
//!
//! # Overview
//!
//! The market data crate supports:
//! - Spot prices (Coinbase), tickers and level-2 books (Coinbase Exchange,
//!   falling back to Binance)
//! - Per-provider retry with linear backoff
//! - Ordered provider fallback with circuit breaking
//! - A local allow-list of pairs, logging each rejected pair once
//! - Polling feeds that can be stopped or retargeted at any time without
//!   stale results leaking through
//!
//! # Architecture
//!
//! ```text
//!   consumer (UI, daemon)
//!         |   start / stop / retarget / subscribe
//!         v
//! +------------------+     +------------------+
//! |   PollingFeed    |     | SpotPriceFetcher |  (feed)
//! +------------------+     +------------------+
//!         |                         |
//!         v                         v
//! +------------------+     +------------------+
//! | ValidatedSource  |     |  PairValidator   |  (price feed / spot only)
//! +------------------+     +------------------+
//!         |                         |
//!         v                         |
//! +------------------+              |
//! |  FallbackChain   |  (providers in priority order)
//! +------------------+              |
//!         |                         v
//!         v                 +------------------+
//! +------------------+      |   RetryPolicy    |  (attempt * 2s backoff)
//! |   RetryPolicy    |      +------------------+
//! +------------------+              |
//!         |                         v
//!         v                 +------------------+
//! +------------------+      |    Provider      |
//! |    Provider      |      +------------------+
//! +------------------+
//!         |
//!         v
//!   FetchOutcome<Quote | OrderBookSnapshot>
//! ```
//!
//! # Core Types
//!
//! - [`TradingPair`] - Canonical `BASE-QUOTE` pair identity
//! - [`Quote`] - A price observation
//! - [`OrderBookSnapshot`] - Level-2 bids and asks from one provider
//! - [`FetchOutcome`] - `Success`, `Retriable` or `Fatal`
//! - [`FeedSnapshot`] - What feed consumers receive
//!
//! # Example
//!
//! ```no_run
//! use pricefeed_market_data::{FeedFactory, FeedSettings};
//!
//! # async fn run() {
//! let factory = FeedFactory::from_settings(FeedSettings::default());
//! let feed = factory.price_feed();
//! let mut updates = feed.subscribe();
//!
//! feed.start("BTC-USD".parse().unwrap());
//! while updates.changed().await.is_ok() {
//!     println!("{}", updates.borrow().price_or_sentinel());
//! }
//! # }
//! ```

pub mod config;
pub mod errors;
pub mod feed;
pub mod models;
pub mod pipeline;
pub mod provider;
pub mod registry;

// Re-export model types
pub use models::{BookLevel, DataKind, OrderBookSnapshot, ProviderId, Quote, Symbol, TradingPair};

// Re-export error types
pub use errors::{ErrorKind, MarketDataError, RetryClass};

// Re-export configuration
pub use config::{FeedSettings, ProviderEndpoints};

// Re-export provider types
pub use provider::binance::BinanceProvider;
pub use provider::coinbase::CoinbaseProvider;
pub use provider::coinbase_exchange::CoinbaseExchangeProvider;
pub use provider::{HttpConfig, MarketDataProvider, ProviderCapabilities};

// Re-export pipeline types
pub use pipeline::{FallbackChain, FeedSource, FetchKind, FetchOutcome, RetryPolicy};

// Re-export registry types
pub use registry::{
    CircuitBreaker, CircuitBreakerConfig, CircuitState, FetchDiagnostics, PairCheck,
    PairValidator, ProviderAttempt, ProviderRegistry, SkipReason, ValidPairSet,
};

// Re-export feed types
pub use feed::{
    FeedError, FeedFactory, FeedSnapshot, OrderBookFeed, PollingFeed, PriceFeed, SpotPriceFetcher,
};
