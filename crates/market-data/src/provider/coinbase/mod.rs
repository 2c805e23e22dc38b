//! Coinbase spot price provider.
//!
//! Serves reference spot prices from the public Coinbase v2 API:
//! `GET /prices/{BASE}-{QUOTE}/spot`, answering
//! `{"data": {"base": "BTC", "currency": "USD", "amount": "27450.12"}}`.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::errors::MarketDataError;
use crate::models::{DataKind, Quote, TradingPair};
use crate::provider::http::{parse_decimal, HttpConfig, HttpSource};
use crate::provider::{MarketDataProvider, ProviderCapabilities};

pub const BASE_URL: &str = "https://api.coinbase.com/v2";
pub const PROVIDER_ID: &str = "COINBASE";

#[derive(Debug, Deserialize)]
struct SpotResponse {
    data: SpotData,
}

#[derive(Debug, Deserialize)]
struct SpotData {
    base: String,
    currency: String,
    amount: String,
}

/// Coinbase spot price provider.
pub struct CoinbaseProvider {
    http: HttpSource,
}

impl CoinbaseProvider {
    pub fn new(config: &HttpConfig) -> Self {
        Self::with_base_url(BASE_URL, config)
    }

    pub fn with_base_url(base_url: impl Into<String>, config: &HttpConfig) -> Self {
        Self {
            http: HttpSource::new(PROVIDER_ID, base_url, config),
        }
    }

    fn to_quote(pair: &TradingPair, response: SpotResponse) -> Result<Quote, MarketDataError> {
        let data = response.data;

        if !data.base.eq_ignore_ascii_case(pair.base())
            || !data.currency.eq_ignore_ascii_case(pair.quote())
        {
            return Err(MarketDataError::MalformedPayload {
                provider: PROVIDER_ID.to_string(),
                message: format!(
                    "Asked for {} but got {}-{}",
                    pair, data.base, data.currency
                ),
            });
        }

        let price = parse_decimal(PROVIDER_ID, "amount", &data.amount)?;
        Ok(Quote::new(pair.clone(), price, PROVIDER_ID))
    }
}

#[async_trait]
impl MarketDataProvider for CoinbaseProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        1
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            data_kinds: &[DataKind::Spot],
        }
    }

    async fn get_spot_price(&self, pair: &TradingPair) -> Result<Quote, MarketDataError> {
        debug!("Fetching spot price for {} from Coinbase", pair);

        let path = format!("/prices/{}/spot", pair.canonical());
        let response: SpotResponse = self.http.get_json(&path, &[], &pair.canonical()).await?;

        Self::to_quote(pair, response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::http::decode;
    use rust_decimal_macros::dec;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn btc_usd() -> TradingPair {
        "BTC-USD".parse().unwrap()
    }

    #[test]
    fn test_provider_id_and_capabilities() {
        let provider = CoinbaseProvider::new(&HttpConfig::default());
        assert_eq!(provider.id(), "COINBASE");
        assert!(provider.capabilities().supports(DataKind::Spot));
        assert!(!provider.capabilities().supports(DataKind::OrderBook));
    }

    #[test]
    fn test_spot_response_parsing() {
        let json = r#"{"data":{"base":"BTC","currency":"USD","amount":"27450.12"}}"#;
        let response: SpotResponse = decode(PROVIDER_ID, json).unwrap();
        let quote = CoinbaseProvider::to_quote(&btc_usd(), response).unwrap();
        assert_eq!(quote.price, dec!(27450.12));
        assert_eq!(quote.source, "COINBASE");
    }

    #[test]
    fn test_mismatched_pair_is_malformed() {
        let json = r#"{"data":{"base":"ETH","currency":"USD","amount":"1600"}}"#;
        let response: SpotResponse = decode(PROVIDER_ID, json).unwrap();
        let err = CoinbaseProvider::to_quote(&btc_usd(), response).unwrap_err();
        assert!(matches!(err, MarketDataError::MalformedPayload { .. }));
    }

    #[tokio::test]
    async fn test_fetch_spot_price() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/prices/BTC-USD/spot"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"data":{"base":"BTC","currency":"USD","amount":"27450.12"}}"#,
                "application/json",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let provider = CoinbaseProvider::with_base_url(server.uri(), &HttpConfig::default());
        let quote = provider.get_spot_price(&btc_usd()).await.unwrap();
        assert_eq!(quote.price, dec!(27450.12));
        assert_eq!(quote.pair, btc_usd());
    }

    #[tokio::test]
    async fn test_not_found_is_invalid_resource() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/prices/ZZZ-USD/spot"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_raw(r#"{"errors":[{"id":"not_found"}]}"#, "application/json"),
            )
            .mount(&server)
            .await;

        let provider = CoinbaseProvider::with_base_url(server.uri(), &HttpConfig::default());
        let err = provider
            .get_spot_price(&"ZZZ-USD".parse().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, MarketDataError::InvalidResource { .. }));
    }

    #[tokio::test]
    async fn test_server_error_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
            .mount(&server)
            .await;

        let provider = CoinbaseProvider::with_base_url(server.uri(), &HttpConfig::default());
        let err = provider.get_spot_price(&btc_usd()).await.unwrap_err();
        assert!(matches!(err, MarketDataError::Transient { .. }));
    }

    #[tokio::test]
    async fn test_unparseable_amount_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"data":{"base":"BTC","currency":"USD","amount":"n/a"}}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let provider = CoinbaseProvider::with_base_url(server.uri(), &HttpConfig::default());
        let err = provider.get_spot_price(&btc_usd()).await.unwrap_err();
        assert!(matches!(err, MarketDataError::MalformedPayload { .. }));
    }
}
