//! Coinbase Exchange provider (primary exchange).
//!
//! Public market data endpoints, keyed by product id `{BASE}-{QUOTE}`:
//! - `GET /products/{BASE}-{QUOTE}/ticker` for the last trade price
//! - `GET /products/{BASE}-{QUOTE}/book?level=2` for the aggregated book

mod models;

use async_trait::async_trait;
use tracing::debug;

use crate::errors::MarketDataError;
use crate::models::{BookLevel, DataKind, OrderBookSnapshot, Quote, TradingPair};
use crate::provider::http::{parse_decimal, parse_level, HttpConfig, HttpSource};
use crate::provider::{MarketDataProvider, ProviderCapabilities};

use models::{BookResponse, TickerResponse};

pub const BASE_URL: &str = "https://api.exchange.coinbase.com";
pub const PROVIDER_ID: &str = "COINBASE_EXCHANGE";

/// Coinbase Exchange ticker and order book provider.
pub struct CoinbaseExchangeProvider {
    http: HttpSource,
}

impl CoinbaseExchangeProvider {
    pub fn new(config: &HttpConfig) -> Self {
        Self::with_base_url(BASE_URL, config)
    }

    pub fn with_base_url(base_url: impl Into<String>, config: &HttpConfig) -> Self {
        Self {
            http: HttpSource::new(PROVIDER_ID, base_url, config),
        }
    }

    fn to_levels(entries: &[Vec<serde_json::Value>]) -> Result<Vec<BookLevel>, MarketDataError> {
        entries
            .iter()
            .map(|entry| parse_level(PROVIDER_ID, entry))
            .collect()
    }

    fn to_book(
        pair: &TradingPair,
        response: BookResponse,
    ) -> Result<OrderBookSnapshot, MarketDataError> {
        Ok(OrderBookSnapshot::new(
            pair.clone(),
            Self::to_levels(&response.bids)?,
            Self::to_levels(&response.asks)?,
            PROVIDER_ID,
        ))
    }
}

#[async_trait]
impl MarketDataProvider for CoinbaseExchangeProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        1
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            data_kinds: &[DataKind::Ticker, DataKind::OrderBook],
        }
    }

    async fn get_ticker(&self, pair: &TradingPair) -> Result<Quote, MarketDataError> {
        debug!("Fetching ticker for {} from Coinbase Exchange", pair);

        let product = pair.canonical();
        let path = format!("/products/{}/ticker", product);
        let response: TickerResponse = self.http.get_json(&path, &[], &product).await?;

        let price = parse_decimal(PROVIDER_ID, "price", &response.price)?;
        Ok(Quote::new(pair.clone(), price, PROVIDER_ID))
    }

    async fn get_order_book(
        &self,
        pair: &TradingPair,
    ) -> Result<OrderBookSnapshot, MarketDataError> {
        debug!("Fetching order book for {} from Coinbase Exchange", pair);

        let product = pair.canonical();
        let path = format!("/products/{}/book", product);
        let response: BookResponse = self
            .http
            .get_json(&path, &[("level", "2")], &product)
            .await?;

        Self::to_book(pair, response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn btc_usd() -> TradingPair {
        "BTC-USD".parse().unwrap()
    }

    #[test]
    fn test_provider_capabilities() {
        let provider = CoinbaseExchangeProvider::new(&HttpConfig::default());
        assert_eq!(provider.id(), "COINBASE_EXCHANGE");
        let caps = provider.capabilities();
        assert!(caps.supports(DataKind::Ticker));
        assert!(caps.supports(DataKind::OrderBook));
        assert!(!caps.supports(DataKind::Spot));
    }

    #[tokio::test]
    async fn test_spot_price_not_supported() {
        let provider = CoinbaseExchangeProvider::new(&HttpConfig::default());
        let err = provider.get_spot_price(&btc_usd()).await.unwrap_err();
        assert!(matches!(err, MarketDataError::NotSupported { .. }));
    }

    #[tokio::test]
    async fn test_fetch_ticker() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products/BTC-USD/ticker"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"trade_id":86326522,"price":"27451.30","size":"0.0004","time":"2023-09-20T10:00:00Z","bid":"27451.29","ask":"27451.30","volume":"8120.1"}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let provider = CoinbaseExchangeProvider::with_base_url(server.uri(), &HttpConfig::default());
        let quote = provider.get_ticker(&btc_usd()).await.unwrap();
        assert_eq!(quote.price, dec!(27451.30));
        assert_eq!(quote.source, PROVIDER_ID);
    }

    #[tokio::test]
    async fn test_fetch_order_book_keeps_provider_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products/BTC-USD/book"))
            .and(query_param("level", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"bids":[["27450.10","0.5",3],["27449.00","1.2",1]],"asks":[["27451.00","0.3",2],["27452.50","4",7]],"sequence":12345}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let provider = CoinbaseExchangeProvider::with_base_url(server.uri(), &HttpConfig::default());
        let book = provider.get_order_book(&btc_usd()).await.unwrap();

        assert_eq!(
            book.bids,
            vec![
                BookLevel::new(dec!(27450.10), dec!(0.5)),
                BookLevel::new(dec!(27449.00), dec!(1.2)),
            ]
        );
        assert_eq!(
            book.asks,
            vec![
                BookLevel::new(dec!(27451.00), dec!(0.3)),
                BookLevel::new(dec!(27452.50), dec!(4)),
            ]
        );
    }

    #[tokio::test]
    async fn test_bad_request_is_invalid_resource() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_raw(r#"{"message":"NotFound"}"#, "application/json"),
            )
            .mount(&server)
            .await;

        let provider = CoinbaseExchangeProvider::with_base_url(server.uri(), &HttpConfig::default());
        let err = provider.get_ticker(&btc_usd()).await.unwrap_err();
        assert!(matches!(err, MarketDataError::InvalidResource { .. }));
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let provider = CoinbaseExchangeProvider::with_base_url(server.uri(), &HttpConfig::default());
        let err = provider.get_order_book(&btc_usd()).await.unwrap_err();
        assert!(matches!(err, MarketDataError::RateLimited { .. }));
    }

    #[tokio::test]
    async fn test_missing_book_side_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(r#"{"bids":[],"sequence":1}"#, "application/json"),
            )
            .mount(&server)
            .await;

        let provider = CoinbaseExchangeProvider::with_base_url(server.uri(), &HttpConfig::default());
        let err = provider.get_order_book(&btc_usd()).await.unwrap_err();
        assert!(matches!(err, MarketDataError::MalformedPayload { .. }));
    }
}
