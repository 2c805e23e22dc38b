//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all acquisition operations
//! - [`ErrorKind`]: The coarse taxonomy published to feed consumers
//! - [`RetryClass`]: Classification for determining retry and fallback behavior

mod retry;

pub use retry::RetryClass;

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while acquiring market data.
///
/// Each variant is classified into a [`RetryClass`] via
/// [`retry_class`](Self::retry_class) and into a consumer-facing
/// [`ErrorKind`] via [`kind`](Self::kind).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketDataError {
    /// The provider asserts the pair or resource does not exist (HTTP 400/404).
    #[error("Invalid resource at {provider}: {resource}")]
    InvalidResource {
        /// The provider that rejected the resource
        provider: String,
        /// The pair or path the provider rejected
        resource: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The provider rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// Connection failure, non-2xx status or a body that is not JSON.
    #[error("Transient error: {provider} - {message}")]
    Transient {
        /// The provider that failed
        provider: String,
        /// Description of the failure
        message: String,
    },

    /// The payload was JSON but required fields were missing or unparseable.
    #[error("Malformed payload from {provider}: {message}")]
    MalformedPayload {
        /// The provider that returned the payload
        provider: String,
        /// Description of the schema mismatch
        message: String,
    },

    /// The pair is not in the known-valid set. Never reaches the network.
    #[error("Pair rejected by policy: {pair}")]
    RejectedByPolicy {
        /// Canonical pair string
        pair: String,
    },

    /// The input could not be parsed as a trading pair.
    #[error("Invalid trading pair: {0}")]
    InvalidPair(String),

    /// The provider does not implement this operation.
    #[error("Operation '{operation}' not supported by {provider}")]
    NotSupported {
        /// The requested operation
        operation: String,
        /// The provider that lacks it
        provider: String,
    },

    /// The circuit breaker is open for this provider.
    #[error("Circuit open: {provider}")]
    CircuitOpen {
        /// The provider with an open circuit
        provider: String,
    },

    /// No providers are configured for the requested data kind.
    #[error("No providers available")]
    NoProvidersAvailable,
}

/// Coarse error taxonomy surfaced to feed consumers.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// The pair or symbol does not exist upstream.
    InvalidResource,
    /// Network, timeout or server-side failure.
    Transient,
    /// The provider answered with data we could not interpret.
    MalformedPayload,
    /// The pair was refused locally and never sent to a provider.
    RejectedByPolicy,
    /// No provider could be asked (none configured, circuits open, unsupported).
    Unavailable,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidResource => write!(f, "InvalidResource"),
            Self::Transient => write!(f, "Transient"),
            Self::MalformedPayload => write!(f, "MalformedPayload"),
            Self::RejectedByPolicy => write!(f, "RejectedByPolicy"),
            Self::Unavailable => write!(f, "Unavailable"),
        }
    }
}

impl MarketDataError {
    /// Returns the retry classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use pricefeed_market_data::errors::{MarketDataError, RetryClass};
    ///
    /// let error = MarketDataError::Timeout { provider: "COINBASE".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    ///
    /// let error = MarketDataError::RejectedByPolicy { pair: "ZZZ-USD".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::Timeout { .. } | Self::RateLimited { .. } | Self::Transient { .. } => {
                RetryClass::WithBackoff
            }

            Self::MalformedPayload { .. } | Self::NotSupported { .. } | Self::CircuitOpen { .. } => {
                RetryClass::NextProvider
            }

            // Upstream 400/404: the pair is unknown, stop the chain.
            Self::InvalidResource { .. }
            | Self::RejectedByPolicy { .. }
            | Self::InvalidPair(_)
            | Self::NoProvidersAvailable => RetryClass::Never,
        }
    }

    /// Returns the consumer-facing error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidResource { .. } => ErrorKind::InvalidResource,
            Self::Timeout { .. } | Self::RateLimited { .. } | Self::Transient { .. } => {
                ErrorKind::Transient
            }
            Self::MalformedPayload { .. } => ErrorKind::MalformedPayload,
            Self::RejectedByPolicy { .. } | Self::InvalidPair(_) => ErrorKind::RejectedByPolicy,
            Self::NotSupported { .. } | Self::CircuitOpen { .. } | Self::NoProvidersAvailable => {
                ErrorKind::Unavailable
            }
        }
    }

    /// The provider that produced this error, if any.
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::InvalidResource { provider, .. }
            | Self::Timeout { provider }
            | Self::RateLimited { provider }
            | Self::Transient { provider, .. }
            | Self::MalformedPayload { provider, .. }
            | Self::NotSupported { provider, .. }
            | Self::CircuitOpen { provider } => Some(provider),
            Self::RejectedByPolicy { .. } | Self::InvalidPair(_) | Self::NoProvidersAvailable => {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_resource_is_terminal() {
        let error = MarketDataError::InvalidResource {
            provider: "COINBASE_EXCHANGE".to_string(),
            resource: "ZZZ-USD".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Never);
        assert_eq!(error.kind(), ErrorKind::InvalidResource);
    }

    #[test]
    fn test_transient_errors_retry_with_backoff() {
        let errors = [
            MarketDataError::Timeout {
                provider: "BINANCE".to_string(),
            },
            MarketDataError::RateLimited {
                provider: "BINANCE".to_string(),
            },
            MarketDataError::Transient {
                provider: "BINANCE".to_string(),
                message: "HTTP 503".to_string(),
            },
        ];

        for error in errors {
            assert_eq!(error.retry_class(), RetryClass::WithBackoff);
            assert_eq!(error.kind(), ErrorKind::Transient);
        }
    }

    #[test]
    fn test_malformed_payload_tries_next_provider() {
        let error = MarketDataError::MalformedPayload {
            provider: "COINBASE".to_string(),
            message: "missing field `amount`".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::NextProvider);
        assert_eq!(error.kind(), ErrorKind::MalformedPayload);
    }

    #[test]
    fn test_policy_rejection_never_retries() {
        let error = MarketDataError::RejectedByPolicy {
            pair: "ZZZ-USD".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Never);
        assert_eq!(error.kind(), ErrorKind::RejectedByPolicy);
        assert_eq!(error.provider(), None);
    }

    #[test]
    fn test_unavailable_kinds() {
        assert_eq!(
            MarketDataError::NoProvidersAvailable.kind(),
            ErrorKind::Unavailable
        );
        assert_eq!(
            MarketDataError::CircuitOpen {
                provider: "BINANCE".to_string()
            }
            .kind(),
            ErrorKind::Unavailable
        );
    }

    #[test]
    fn test_provider_accessor() {
        let error = MarketDataError::Timeout {
            provider: "COINBASE".to_string(),
        };
        assert_eq!(error.provider(), Some("COINBASE"));
    }

    #[test]
    fn test_error_display() {
        let error = MarketDataError::InvalidPair("BTCUSD".to_string());
        assert_eq!(format!("{}", error), "Invalid trading pair: BTCUSD");

        let error = MarketDataError::Transient {
            provider: "BINANCE".to_string(),
            message: "HTTP 502".to_string(),
        };
        assert_eq!(format!("{}", error), "Transient error: BINANCE - HTTP 502");
    }
}
