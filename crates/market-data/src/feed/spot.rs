//! Ad hoc spot quotes.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::errors::{ErrorKind, MarketDataError};
use crate::models::{Quote, TradingPair};
use crate::pipeline::{FetchOutcome, RetryPolicy};
use crate::provider::MarketDataProvider;
use crate::registry::PairValidator;

/// One-shot spot price lookup against a single provider.
///
/// Validation, then retry, no fallback and no polling. Calls on the same
/// fetcher run one at a time.
pub struct SpotPriceFetcher {
    provider: Arc<dyn MarketDataProvider>,
    validator: Arc<PairValidator>,
    retry: RetryPolicy,
    in_flight: Mutex<()>,
}

impl SpotPriceFetcher {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        validator: Arc<PairValidator>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            provider,
            validator,
            retry,
            in_flight: Mutex::new(()),
        }
    }

    pub fn provider_id(&self) -> &'static str {
        self.provider.id()
    }

    /// The quote, or `None` on any failure. Failures are logged, never raised.
    pub async fn fetch(
        &self,
        pair: &TradingPair,
        max_attempts: u32,
        allow_unlisted: bool,
    ) -> Option<Quote> {
        self.fetch_outcome(pair, max_attempts, allow_unlisted)
            .await
            .ok()
    }

    /// Same as [`fetch`](Self::fetch), keeping the failure.
    pub async fn fetch_outcome(
        &self,
        pair: &TradingPair,
        max_attempts: u32,
        allow_unlisted: bool,
    ) -> FetchOutcome<Quote> {
        if !self.validator.check_with(pair, allow_unlisted).is_allowed() {
            return FetchOutcome::Fatal(MarketDataError::RejectedByPolicy {
                pair: pair.canonical(),
            });
        }

        let _guard = self.in_flight.lock().await;
        debug!(
            "Fetching spot price for {} from {} (up to {} attempts)",
            pair,
            self.provider.id(),
            max_attempts
        );

        let outcome = self
            .retry
            .with_max_attempts(max_attempts)
            .run(|| self.provider.get_spot_price(pair))
            .await;

        if let Some(error) = outcome.error() {
            match error.kind() {
                ErrorKind::InvalidResource => warn!(
                    "Spot price for {} is not available from {}",
                    pair,
                    self.provider.id()
                ),
                _ => warn!("Spot price for {} failed: {}", pair, error),
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DataKind;
    use crate::provider::ProviderCapabilities;
    use crate::registry::ValidPairSet;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyProvider {
        calls: AtomicU32,
        failures: u32,
    }

    #[async_trait]
    impl MarketDataProvider for FlakyProvider {
        fn id(&self) -> &'static str {
            "FLAKY"
        }

        fn capabilities(&self) -> ProviderCapabilities {
            ProviderCapabilities {
                data_kinds: &[DataKind::Spot],
            }
        }

        async fn get_spot_price(&self, pair: &TradingPair) -> Result<Quote, MarketDataError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(MarketDataError::Transient {
                    provider: "FLAKY".to_string(),
                    message: "HTTP 503".to_string(),
                })
            } else {
                Ok(Quote::new(pair.clone(), dec!(1.5), "FLAKY"))
            }
        }
    }

    fn fetcher(failures: u32) -> (SpotPriceFetcher, Arc<FlakyProvider>) {
        let provider = Arc::new(FlakyProvider {
            calls: AtomicU32::new(0),
            failures,
        });
        let validator = Arc::new(PairValidator::new(ValidPairSet::new(["ADA-USD"]), false));
        (
            SpotPriceFetcher::new(provider.clone(), validator, RetryPolicy::default()),
            provider,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_then_succeeds() {
        let (fetcher, provider) = fetcher(2);
        let quote = fetcher.fetch(&"ADA-USD".parse().unwrap(), 3, false).await;
        assert_eq!(quote.map(|q| q.price), Some(dec!(1.5)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_budget_is_per_call() {
        let (fetcher, provider) = fetcher(2);
        let quote = fetcher.fetch(&"ADA-USD".parse().unwrap(), 2, false).await;
        assert!(quote.is_none());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unlisted_pair_skips_provider() {
        let (fetcher, provider) = fetcher(0);
        let pair: TradingPair = "ZZZ-USD".parse().unwrap();

        assert!(fetcher.fetch(&pair, 3, false).await.is_none());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);

        // The per-call flag opens the gate.
        assert!(fetcher.fetch(&pair, 3, true).await.is_some());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }
}
