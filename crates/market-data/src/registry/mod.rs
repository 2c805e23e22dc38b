//! Provider registry module.
//!
//! This module provides orchestration around market data providers:
//! - Provider registration and priority ordering
//! - Circuit breaking for fault tolerance
//! - Trading pair validation with log-once rejection
//! - Diagnostic tracking for debugging provider selection

mod circuit_breaker;
mod pair_validator;
mod provider_registry;
mod skip_reason;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use pair_validator::{PairCheck, PairValidator, ValidPairSet, DEFAULT_VALID_PAIRS};
pub use provider_registry::ProviderRegistry;
pub use skip_reason::{FetchDiagnostics, ProviderAttempt, SkipReason};
