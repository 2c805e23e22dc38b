//! Market data provider abstractions and implementations.
//!
//! This module contains:
//! - The `MarketDataProvider` trait that all providers implement
//! - Provider capabilities (which data kinds a provider serves)
//! - Shared HTTP request/classification plumbing
//! - Concrete providers (Coinbase, Coinbase Exchange, Binance)
//!
//! Providers are stateless per call: one request, one classified result.
//! Retrying, falling back and scheduling live in the `pipeline` and `feed`
//! modules.

mod capabilities;
mod http;
mod traits;

pub mod binance;
pub mod coinbase;
pub mod coinbase_exchange;

// Re-exports
pub use capabilities::ProviderCapabilities;
pub use http::{HttpConfig, HttpSource, DEFAULT_REQUEST_TIMEOUT, DEFAULT_RESOURCE_TIMEOUT};
pub use traits::MarketDataProvider;
