//! Per-provider circuit breaker.
//!
//! A provider whose retry budget keeps running out on transient failures is
//! taken out of its chain for a while, so every poll tick does not pay the
//! full backoff for a source that is down.
//!
//! - **Closed**: requests flow.
//! - **Open**: the provider is skipped.
//! - **HalfOpen**: the recovery window elapsed; requests flow again until the
//!   next failure reopens the circuit or enough successes close it.
//!
//! Only failures the pipeline reports count. Invalid resources and malformed
//! payloads say nothing about provider health and are never recorded.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, info, warn};
use serde::Deserialize;
use tokio::time::Instant;

use crate::models::ProviderId;

const DEFAULT_FAILURE_THRESHOLD: u32 = 5;
const DEFAULT_RECOVERY_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_HALF_OPEN_SUCCESS_THRESHOLD: u32 = 2;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "Closed"),
            Self::Open => write!(f, "Open"),
            Self::HalfOpen => write!(f, "HalfOpen"),
        }
    }
}

#[derive(Debug)]
struct Circuit {
    state: CircuitState,
    failures: u32,
    half_open_successes: u32,
    opened_at: Option<Instant>,
}

impl Circuit {
    fn closed() -> Self {
        Self {
            state: CircuitState::Closed,
            failures: 0,
            half_open_successes: 0,
            opened_at: None,
        }
    }

    fn open(&mut self) {
        self.state = CircuitState::Open;
        self.half_open_successes = 0;
        self.opened_at = Some(Instant::now());
    }
}

/// Circuit breaker tuning.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CircuitBreakerConfig {
    /// Exhausted fetches before the circuit opens.
    pub failure_threshold: u32,
    /// How long an open circuit stays open.
    #[serde(with = "crate::config::secs")]
    pub recovery_timeout: Duration,
    /// Successes in HalfOpen needed to close again.
    pub half_open_success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            recovery_timeout: DEFAULT_RECOVERY_TIMEOUT,
            half_open_success_threshold: DEFAULT_HALF_OPEN_SUCCESS_THRESHOLD,
        }
    }
}

/// Thread-safe, in-memory breaker keyed by provider id.
#[derive(Debug)]
pub struct CircuitBreaker {
    circuits: Mutex<HashMap<String, Circuit>>,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    pub fn new() -> Self {
        Self::with_config(CircuitBreakerConfig::default())
    }

    pub fn with_config(config: CircuitBreakerConfig) -> Self {
        Self {
            circuits: Mutex::new(HashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    // A poisoned map at worst holds a stale state for one provider.
    fn lock_circuits(&self) -> MutexGuard<'_, HashMap<String, Circuit>> {
        self.circuits.lock().unwrap_or_else(|poisoned| {
            warn!("Circuit breaker mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Whether `provider` may be asked right now.
    ///
    /// Moves an Open circuit to HalfOpen once its recovery window has passed.
    pub fn is_allowed(&self, provider: &ProviderId) -> bool {
        let mut circuits = self.lock_circuits();
        let Some(circuit) = circuits.get_mut(provider.as_ref()) else {
            return true;
        };

        match circuit.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let recovered = circuit
                    .opened_at
                    .is_some_and(|at| at.elapsed() >= self.config.recovery_timeout);
                if recovered {
                    info!("Circuit for '{}' is now HalfOpen", provider);
                    circuit.state = CircuitState::HalfOpen;
                    circuit.half_open_successes = 0;
                }
                recovered
            }
        }
    }

    pub fn record_success(&self, provider: &ProviderId) {
        let mut circuits = self.lock_circuits();
        let Some(circuit) = circuits.get_mut(provider.as_ref()) else {
            return;
        };

        match circuit.state {
            CircuitState::Closed => circuit.failures = 0,
            CircuitState::HalfOpen => {
                circuit.half_open_successes += 1;
                if circuit.half_open_successes >= self.config.half_open_success_threshold {
                    info!(
                        "Closing circuit for '{}' after {} successes",
                        provider, circuit.half_open_successes
                    );
                    *circuit = Circuit::closed();
                }
            }
            CircuitState::Open => {
                debug!("Success for '{}' while its circuit is open", provider);
            }
        }
    }

    pub fn record_failure(&self, provider: &ProviderId) {
        let mut circuits = self.lock_circuits();
        let circuit = circuits
            .entry(provider.to_string())
            .or_insert_with(Circuit::closed);

        circuit.failures += 1;

        match circuit.state {
            CircuitState::Closed if circuit.failures >= self.config.failure_threshold => {
                warn!(
                    "Opening circuit for '{}' after {} failed fetches",
                    provider, circuit.failures
                );
                circuit.open();
            }
            CircuitState::Closed => {
                debug!(
                    "Failure for '{}' ({}/{})",
                    provider, circuit.failures, self.config.failure_threshold
                );
            }
            CircuitState::HalfOpen => {
                warn!("Reopening circuit for '{}' after failure in HalfOpen", provider);
                circuit.open();
            }
            CircuitState::Open => {}
        }
    }

    pub fn state(&self, provider: &ProviderId) -> CircuitState {
        self.lock_circuits()
            .get(provider.as_ref())
            .map(|c| c.state)
            .unwrap_or(CircuitState::Closed)
    }

    pub fn failure_count(&self, provider: &ProviderId) -> u32 {
        self.lock_circuits()
            .get(provider.as_ref())
            .map(|c| c.failures)
            .unwrap_or(0)
    }

    pub fn reset(&self, provider: &ProviderId) {
        if self.lock_circuits().remove(provider.as_ref()).is_some() {
            info!("Circuit for '{}' reset", provider);
        }
    }

    pub fn reset_all(&self) {
        self.lock_circuits().clear();
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new()
    }
}
