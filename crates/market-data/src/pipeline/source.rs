//! Fetch kinds and the source abstraction feeds poll.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use super::FetchOutcome;
use crate::errors::MarketDataError;
use crate::models::{DataKind, OrderBookSnapshot, Quote, TradingPair};
use crate::provider::MarketDataProvider;
use crate::registry::PairValidator;

/// Selects which provider operation a pipeline runs.
///
/// Lets one `FallbackChain` implementation serve spot prices, tickers and
/// order books.
pub trait FetchKind: Send + Sync + 'static {
    type Output: Clone + Send + Sync + 'static;

    const KIND: DataKind;

    fn fetch<'a>(
        provider: &'a dyn MarketDataProvider,
        pair: &'a TradingPair,
    ) -> BoxFuture<'a, Result<Self::Output, MarketDataError>>;
}

/// Reference spot price.
pub struct SpotPrice;

/// Last traded price.
pub struct Ticker;

/// Level-2 order book.
pub struct OrderBook;

impl FetchKind for SpotPrice {
    type Output = Quote;
    const KIND: DataKind = DataKind::Spot;

    fn fetch<'a>(
        provider: &'a dyn MarketDataProvider,
        pair: &'a TradingPair,
    ) -> BoxFuture<'a, Result<Quote, MarketDataError>> {
        provider.get_spot_price(pair)
    }
}

impl FetchKind for Ticker {
    type Output = Quote;
    const KIND: DataKind = DataKind::Ticker;

    fn fetch<'a>(
        provider: &'a dyn MarketDataProvider,
        pair: &'a TradingPair,
    ) -> BoxFuture<'a, Result<Quote, MarketDataError>> {
        provider.get_ticker(pair)
    }
}

impl FetchKind for OrderBook {
    type Output = OrderBookSnapshot;
    const KIND: DataKind = DataKind::OrderBook;

    fn fetch<'a>(
        provider: &'a dyn MarketDataProvider,
        pair: &'a TradingPair,
    ) -> BoxFuture<'a, Result<OrderBookSnapshot, MarketDataError>> {
        provider.get_order_book(pair)
    }
}

/// Something a [`PollingFeed`](crate::feed::PollingFeed) can poll.
///
/// Implementations resolve every failure to a typed outcome; they never
/// panic or hang past their own timeouts.
#[async_trait]
pub trait FeedSource: Send + Sync + 'static {
    type Output: Clone + Send + Sync + 'static;

    async fn fetch(&self, pair: &TradingPair) -> FetchOutcome<Self::Output>;
}

/// Puts a [`PairValidator`] in front of another source.
///
/// Rejected pairs resolve to `Fatal(RejectedByPolicy)` without touching the
/// inner source.
pub struct ValidatedSource<S> {
    inner: S,
    validator: Arc<PairValidator>,
}

impl<S> ValidatedSource<S> {
    pub fn new(inner: S, validator: Arc<PairValidator>) -> Self {
        Self { inner, validator }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: FeedSource> FeedSource for ValidatedSource<S> {
    type Output = S::Output;

    async fn fetch(&self, pair: &TradingPair) -> FetchOutcome<Self::Output> {
        if !self.validator.check_allowed(pair) {
            return FetchOutcome::Fatal(MarketDataError::RejectedByPolicy {
                pair: pair.canonical(),
            });
        }

        self.inner.fetch(pair).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ValidPairSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FeedSource for CountingSource {
        type Output = u32;

        async fn fetch(&self, _pair: &TradingPair) -> FetchOutcome<u32> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            FetchOutcome::Success(1)
        }
    }

    fn validated() -> ValidatedSource<CountingSource> {
        let validator = PairValidator::new(ValidPairSet::new(["BTC-USD"]), false);
        ValidatedSource::new(
            CountingSource {
                calls: AtomicUsize::new(0),
            },
            Arc::new(validator),
        )
    }

    #[tokio::test]
    async fn test_listed_pair_reaches_inner_source() {
        let source = validated();
        let outcome = source.fetch(&"btc-usd".parse().unwrap()).await;
        assert_eq!(outcome, FetchOutcome::Success(1));
        assert_eq!(source.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unlisted_pair_never_reaches_inner_source() {
        let source = validated();
        let outcome = source.fetch(&"ZZZ-USD".parse().unwrap()).await;
        assert_eq!(
            outcome,
            FetchOutcome::Fatal(MarketDataError::RejectedByPolicy {
                pair: "ZZZ-USD".to_string()
            })
        );
        assert_eq!(source.inner().calls.load(Ordering::SeqCst), 0);
    }
}
