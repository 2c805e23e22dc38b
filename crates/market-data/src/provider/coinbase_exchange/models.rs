//! Response shapes of the Coinbase Exchange public REST API.

use serde::Deserialize;

/// `GET /products/{product_id}/ticker`
#[derive(Debug, Deserialize)]
pub struct TickerResponse {
    /// Last trade price
    pub price: String,
    // Note: trade_id, size, time, bid, ask, volume exist but are not used
}

/// `GET /products/{product_id}/book?level=2`
///
/// Each entry is `[price, size, num_orders]`.
#[derive(Debug, Deserialize)]
pub struct BookResponse {
    pub bids: Vec<Vec<serde_json::Value>>,
    pub asks: Vec<Vec<serde_json::Value>>,
    #[allow(dead_code)]
    #[serde(default)]
    pub sequence: Option<u64>,
}
