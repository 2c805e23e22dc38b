//! Market data models
//!
//! This module contains the core data types for market data acquisition:
//! - `types` - Type aliases for common identifiers (ProviderId, Symbol)
//! - `pair` - Canonical trading pair identity (TradingPair)
//! - `kind` - The data kinds a provider can serve (DataKind)
//! - `quote` - Price quotes (Quote)
//! - `order_book` - Level-2 order book snapshots (OrderBookSnapshot, BookLevel)

mod kind;
mod order_book;
mod pair;
mod quote;
mod types;

pub use kind::DataKind;
pub use order_book::{BookLevel, OrderBookSnapshot};
pub use pair::TradingPair;
pub use quote::Quote;
pub use types::{ProviderId, Symbol};
