//! Ordered provider fallback.

use std::borrow::Cow;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use tracing::{debug, warn};

use super::{FeedSource, FetchKind, FetchOutcome, RetryPolicy};
use crate::errors::{MarketDataError, RetryClass};
use crate::models::{ProviderId, TradingPair};
use crate::provider::MarketDataProvider;
use crate::registry::{CircuitBreaker, FetchDiagnostics, SkipReason};

/// Tries providers in a fixed order, each under its own [`RetryPolicy`].
///
/// Provider *i+1* is only asked once provider *i* has settled on a
/// non-success outcome after its full retry budget. When every provider
/// fails, the last provider's error is returned; it names that provider.
///
/// A `Never` error (the request itself is bad, or a provider answered that
/// the pair does not exist) stops the chain at once. Providers whose circuit
/// is open are skipped.
///
/// Each chain owns its [`CircuitBreaker`]; failures seen by one chain never
/// change which providers another chain asks.
pub struct FallbackChain<K: FetchKind> {
    providers: Vec<Arc<dyn MarketDataProvider>>,
    retry: RetryPolicy,
    circuit_breaker: CircuitBreaker,
    _kind: PhantomData<fn() -> K>,
}

impl<K: FetchKind> FallbackChain<K> {
    pub fn new(
        providers: Vec<Arc<dyn MarketDataProvider>>,
        retry: RetryPolicy,
        circuit_breaker: CircuitBreaker,
    ) -> Self {
        Self {
            providers,
            retry,
            circuit_breaker,
            _kind: PhantomData,
        }
    }

    /// Provider ids in the order they are tried.
    pub fn provider_ids(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.circuit_breaker
    }

    pub async fn execute(&self, pair: &TradingPair) -> FetchOutcome<K::Output> {
        self.execute_with_diagnostics(pair).await.0
    }

    /// Like [`execute`](Self::execute), also reporting what each provider did.
    pub async fn execute_with_diagnostics(
        &self,
        pair: &TradingPair,
    ) -> (FetchOutcome<K::Output>, FetchDiagnostics) {
        let mut diagnostics = FetchDiagnostics::new();

        if self.providers.is_empty() {
            warn!("No providers configured for {} ({})", K::KIND, pair);
            return (
                FetchOutcome::Fatal(MarketDataError::NoProvidersAvailable),
                diagnostics,
            );
        }

        let mut last: Option<MarketDataError> = None;

        for provider in &self.providers {
            let provider_id: ProviderId = Cow::Borrowed(provider.id());

            if !self.circuit_breaker.is_allowed(&provider_id) {
                debug!(
                    "Circuit breaker open for provider '{}', skipping",
                    provider_id
                );
                diagnostics.record_skip(provider_id.clone(), SkipReason::CircuitBreakerOpen);
                last = Some(MarketDataError::CircuitOpen {
                    provider: provider_id.to_string(),
                });
                continue;
            }

            let mut attempts = 0;
            let outcome = self
                .retry
                .execute(|attempt| {
                    attempts = attempt;
                    K::fetch(provider.as_ref(), pair).map(FetchOutcome::from)
                })
                .await
                .into_terminal();

            let error = match outcome {
                FetchOutcome::Success(value) => {
                    self.circuit_breaker.record_success(&provider_id);
                    diagnostics.record_success(provider_id, attempts);
                    return (FetchOutcome::Success(value), diagnostics);
                }
                FetchOutcome::Retriable(e) | FetchOutcome::Fatal(e) => e,
            };

            diagnostics.record_error(provider_id.clone(), attempts, error.to_string());

            match error.retry_class() {
                RetryClass::Never => {
                    debug!(
                        "Terminal error from '{}': {}, not trying other providers",
                        provider_id, error
                    );
                    return (FetchOutcome::Fatal(error), diagnostics);
                }
                RetryClass::WithBackoff => {
                    self.circuit_breaker.record_failure(&provider_id);
                }
                RetryClass::NextProvider => {}
            }

            debug!(
                "Provider '{}' failed {} for {} after {} attempt(s): {}",
                provider_id,
                K::KIND,
                pair,
                attempts,
                error
            );
            last = Some(error);
        }

        warn!(
            "All providers failed {} for {}. Diagnostics: {}",
            K::KIND,
            pair,
            diagnostics.summary()
        );

        let error = last.unwrap_or(MarketDataError::NoProvidersAvailable);
        (FetchOutcome::Fatal(error), diagnostics)
    }
}

#[async_trait]
impl<K: FetchKind> FeedSource for FallbackChain<K> {
    type Output = K::Output;

    async fn fetch(&self, pair: &TradingPair) -> FetchOutcome<K::Output> {
        self.execute(pair).await
    }
}
