//! Wires settings, providers and the shared validator into feeds.

use std::sync::Arc;

use crate::config::FeedSettings;
use crate::errors::MarketDataError;
use crate::models::DataKind;
use crate::pipeline::{FallbackChain, OrderBook, Ticker, ValidatedSource};
use crate::provider::binance::BinanceProvider;
use crate::provider::coinbase::CoinbaseProvider;
use crate::provider::coinbase_exchange::CoinbaseExchangeProvider;
use crate::provider::MarketDataProvider;
use crate::registry::{PairValidator, ProviderRegistry, ValidPairSet};

use super::{PollingFeed, SpotPriceFetcher};

/// Price feed: validated ticker chain.
pub type PriceFeed = PollingFeed<ValidatedSource<FallbackChain<Ticker>>>;

/// Order book feed: unvalidated book chain.
pub type OrderBookFeed = PollingFeed<FallbackChain<OrderBook>>;

/// Builds feeds that share one validator, one registry and one set of
/// settings. Construct once at startup.
pub struct FeedFactory {
    settings: FeedSettings,
    validator: Arc<PairValidator>,
    registry: ProviderRegistry,
}

impl FeedFactory {
    /// Coinbase for spot prices, Coinbase Exchange then Binance for tickers
    /// and books.
    pub fn from_settings(settings: FeedSettings) -> Self {
        let http = settings.http_config();
        let endpoints = &settings.endpoints;

        let providers: Vec<Arc<dyn MarketDataProvider>> = vec![
            Arc::new(CoinbaseProvider::with_base_url(&endpoints.coinbase, &http)),
            Arc::new(CoinbaseExchangeProvider::with_base_url(
                &endpoints.coinbase_exchange,
                &http,
            )),
            Arc::new(
                BinanceProvider::with_base_url(&endpoints.binance, &http)
                    .with_depth(settings.order_book_depth),
            ),
        ];

        let registry = ProviderRegistry::with_config(
            providers,
            settings.circuit_breaker.clone(),
            Default::default(),
        );

        Self::with_registry(settings, registry)
    }

    pub fn with_registry(settings: FeedSettings, registry: ProviderRegistry) -> Self {
        let validator = Arc::new(PairValidator::new(
            ValidPairSet::new(&settings.valid_pairs),
            settings.allow_unlisted,
        ));

        Self {
            settings,
            validator,
            registry,
        }
    }

    pub fn settings(&self) -> &FeedSettings {
        &self.settings
    }

    pub fn validator(&self) -> &Arc<PairValidator> {
        &self.validator
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn price_feed(&self) -> PriceFeed {
        let chain = self.registry.chain::<Ticker>(self.settings.retry_policy());
        PollingFeed::new(
            "price",
            ValidatedSource::new(chain, self.validator.clone()),
            self.settings.price_interval(),
        )
    }

    pub fn order_book_feed(&self) -> OrderBookFeed {
        PollingFeed::new(
            "order_book",
            self.registry.chain::<OrderBook>(self.settings.retry_policy()),
            self.settings.order_book_interval(),
        )
    }

    pub fn spot_fetcher(&self) -> Result<SpotPriceFetcher, MarketDataError> {
        let provider = self
            .registry
            .provider_for(DataKind::Spot)
            .ok_or(MarketDataError::NoProvidersAvailable)?;

        Ok(SpotPriceFetcher::new(
            provider,
            self.validator.clone(),
            self.settings.retry_policy(),
        ))
    }
}
