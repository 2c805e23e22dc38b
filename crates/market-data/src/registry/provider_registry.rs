//! Provider registry: priority ordering and chain construction.
//!
//! The registry owns the provider set and the circuit-breaker settings. Each
//! feed asks it for a [`FallbackChain`] over the providers that serve the
//! feed's data kind, ordered by priority (lower first). Providers with equal
//! priority keep their registration order.
//!
//! Every chain gets a fresh [`CircuitBreaker`], so feeds share no provider
//! health state.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use super::{CircuitBreaker, CircuitBreakerConfig};
use crate::models::DataKind;
use crate::pipeline::{FallbackChain, FetchKind, RetryPolicy};
use crate::provider::MarketDataProvider;

pub struct ProviderRegistry {
    providers: Vec<Arc<dyn MarketDataProvider>>,
    breaker_config: CircuitBreakerConfig,
    /// Overrides for `MarketDataProvider::priority`, keyed by provider id.
    custom_priorities: HashMap<String, i32>,
}

impl ProviderRegistry {
    pub fn new(providers: Vec<Arc<dyn MarketDataProvider>>) -> Self {
        Self::with_config(providers, CircuitBreakerConfig::default(), HashMap::new())
    }

    pub fn with_config(
        providers: Vec<Arc<dyn MarketDataProvider>>,
        breaker_config: CircuitBreakerConfig,
        custom_priorities: HashMap<String, i32>,
    ) -> Self {
        Self {
            providers,
            breaker_config,
            custom_priorities,
        }
    }

    pub fn providers(&self) -> &[Arc<dyn MarketDataProvider>] {
        &self.providers
    }

    fn effective_priority(&self, provider: &dyn MarketDataProvider) -> i32 {
        self.custom_priorities
            .get(provider.id())
            .copied()
            .unwrap_or_else(|| i32::from(provider.priority()))
    }

    /// Providers serving `kind`, in the order a chain tries them.
    pub fn providers_for(&self, kind: DataKind) -> Vec<Arc<dyn MarketDataProvider>> {
        let mut providers: Vec<_> = self
            .providers
            .iter()
            .filter(|p| p.capabilities().supports(kind))
            .cloned()
            .collect();

        // Stable, so equal priorities keep registration order.
        providers.sort_by_key(|p| self.effective_priority(p.as_ref()));
        providers
    }

    /// Highest-priority provider serving `kind`.
    pub fn provider_for(&self, kind: DataKind) -> Option<Arc<dyn MarketDataProvider>> {
        self.providers_for(kind).into_iter().next()
    }

    /// Fallback chain over every provider serving `K`, with its own breaker.
    pub fn chain<K: FetchKind>(&self, retry: RetryPolicy) -> FallbackChain<K> {
        let providers = self.providers_for(K::KIND);
        debug!(
            "{} chain: [{}]",
            K::KIND,
            providers
                .iter()
                .map(|p| p.id())
                .collect::<Vec<_>>()
                .join(", ")
        );
        FallbackChain::new(
            providers,
            retry,
            CircuitBreaker::with_config(self.breaker_config.clone()),
        )
    }

    pub fn breaker_config(&self) -> &CircuitBreakerConfig {
        &self.breaker_config
    }
}
