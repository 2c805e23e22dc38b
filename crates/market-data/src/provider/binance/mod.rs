//! Binance provider (secondary exchange).
//!
//! Binance lists crypto against stablecoins rather than fiat, so every pair is
//! mapped to `{BASE}USDT` regardless of the requested quote currency. Results
//! are still reported under the requested pair: the feed consumer asked for
//! `BTC-USD` and USDT is the stand-in for USD here.
//!
//! Endpoints:
//! - `GET /api/v3/ticker/price?symbol=BTCUSDT`
//! - `GET /api/v3/depth?symbol=BTCUSDT&limit=50`

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::errors::MarketDataError;
use crate::models::{BookLevel, DataKind, OrderBookSnapshot, Quote, TradingPair};
use crate::provider::http::{parse_decimal, parse_level, HttpConfig, HttpSource};
use crate::provider::{MarketDataProvider, ProviderCapabilities};

pub const BASE_URL: &str = "https://api.binance.com";
pub const PROVIDER_ID: &str = "BINANCE";

/// Stablecoin every symbol is quoted in.
pub const STABLE_QUOTE: &str = "USDT";

/// Depth limits accepted by `/api/v3/depth`.
const DEPTH_LIMITS: &[u16] = &[5, 10, 20, 50, 100, 500, 1000, 5000];

/// Default number of levels requested per side.
pub const DEFAULT_DEPTH: u16 = 50;

#[derive(Debug, Deserialize)]
struct PriceResponse {
    symbol: String,
    price: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DepthResponse {
    #[allow(dead_code)]
    last_update_id: u64,
    bids: Vec<Vec<serde_json::Value>>,
    asks: Vec<Vec<serde_json::Value>>,
}

/// Binance ticker and depth provider.
pub struct BinanceProvider {
    http: HttpSource,
    depth: u16,
}

impl BinanceProvider {
    pub fn new(config: &HttpConfig) -> Self {
        Self::with_base_url(BASE_URL, config)
    }

    pub fn with_base_url(base_url: impl Into<String>, config: &HttpConfig) -> Self {
        Self {
            http: HttpSource::new(PROVIDER_ID, base_url, config),
            depth: DEFAULT_DEPTH,
        }
    }

    /// Request `depth` levels per side, rounded up to the nearest limit the
    /// API accepts.
    pub fn with_depth(mut self, depth: u16) -> Self {
        self.depth = DEPTH_LIMITS
            .iter()
            .copied()
            .find(|limit| *limit >= depth)
            .unwrap_or(5000);
        self
    }

    /// Exchange symbol for a pair, e.g. `BTC-USD` -> `BTCUSDT`.
    pub fn symbol_for(pair: &TradingPair) -> String {
        format!("{}{}", pair.base(), STABLE_QUOTE)
    }

    fn to_levels(entries: &[Vec<serde_json::Value>]) -> Result<Vec<BookLevel>, MarketDataError> {
        entries
            .iter()
            .map(|entry| parse_level(PROVIDER_ID, entry))
            .collect()
    }
}

#[async_trait]
impl MarketDataProvider for BinanceProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        2
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            data_kinds: &[DataKind::Ticker, DataKind::OrderBook],
        }
    }

    async fn get_ticker(&self, pair: &TradingPair) -> Result<Quote, MarketDataError> {
        let symbol = Self::symbol_for(pair);
        debug!("Fetching ticker for {} ({}) from Binance", pair, symbol);

        let response: PriceResponse = self
            .http
            .get_json("/api/v3/ticker/price", &[("symbol", symbol.as_str())], &symbol)
            .await?;

        if response.symbol != symbol {
            return Err(MarketDataError::MalformedPayload {
                provider: PROVIDER_ID.to_string(),
                message: format!("Asked for {} but got {}", symbol, response.symbol),
            });
        }

        let price = parse_decimal(PROVIDER_ID, "price", &response.price)?;
        Ok(Quote::new(pair.clone(), price, PROVIDER_ID))
    }

    async fn get_order_book(
        &self,
        pair: &TradingPair,
    ) -> Result<OrderBookSnapshot, MarketDataError> {
        let symbol = Self::symbol_for(pair);
        let limit = self.depth.to_string();
        debug!("Fetching depth for {} ({}) from Binance", pair, symbol);

        let response: DepthResponse = self
            .http
            .get_json(
                "/api/v3/depth",
                &[("symbol", symbol.as_str()), ("limit", limit.as_str())],
                &symbol,
            )
            .await?;

        Ok(OrderBookSnapshot::new(
            pair.clone(),
            Self::to_levels(&response.bids)?,
            Self::to_levels(&response.asks)?,
            PROVIDER_ID,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_symbol_uses_stable_quote() {
        let pair: TradingPair = "eth-usd".parse().unwrap();
        assert_eq!(BinanceProvider::symbol_for(&pair), "ETHUSDT");
    }

    #[test]
    fn test_depth_rounds_up_to_supported_limit() {
        let config = HttpConfig::default();
        assert_eq!(BinanceProvider::new(&config).with_depth(30).depth, 50);
        assert_eq!(BinanceProvider::new(&config).with_depth(5).depth, 5);
        assert_eq!(BinanceProvider::new(&config).with_depth(9000).depth, 5000);
    }

    #[tokio::test]
    async fn test_fetch_ticker() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/ticker/price"))
            .and(query_param("symbol", "BTCUSDT"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"symbol":"BTCUSDT","price":"27449.99000000"}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let provider = BinanceProvider::with_base_url(server.uri(), &HttpConfig::default());
        let pair: TradingPair = "BTC-USD".parse().unwrap();
        let quote = provider.get_ticker(&pair).await.unwrap();
        assert_eq!(quote.price, dec!(27449.99));
        assert_eq!(quote.pair, pair);
    }

    #[tokio::test]
    async fn test_fetch_depth() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/depth"))
            .and(query_param("symbol", "BTCUSDT"))
            .and(query_param("limit", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"lastUpdateId":1027024,"bids":[["4.00000000","431.00000000"]],"asks":[["4.00000200","12.00000000"]]}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let provider = BinanceProvider::with_base_url(server.uri(), &HttpConfig::default());
        let book = provider
            .get_order_book(&"BTC-USD".parse().unwrap())
            .await
            .unwrap();
        assert_eq!(book.bids, vec![BookLevel::new(dec!(4), dec!(431))]);
        assert_eq!(book.asks, vec![BookLevel::new(dec!(4.000002), dec!(12))]);
        assert_eq!(book.source, PROVIDER_ID);
    }

    #[tokio::test]
    async fn test_invalid_symbol_is_invalid_resource() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_raw(
                r#"{"code":-1121,"msg":"Invalid symbol."}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let provider = BinanceProvider::with_base_url(server.uri(), &HttpConfig::default());
        let err = provider
            .get_ticker(&"ZZZ-USD".parse().unwrap())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            MarketDataError::InvalidResource {
                provider: PROVIDER_ID.to_string(),
                resource: "ZZZUSDT".to_string(),
            }
        );
    }
}
