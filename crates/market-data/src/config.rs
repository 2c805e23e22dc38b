//! Feed settings.
//!
//! Everything here is supplied once, when feeds are built, and never changes
//! afterwards.

use std::time::Duration;

use serde::Deserialize;

use crate::pipeline::{RetryPolicy, DEFAULT_BACKOFF_STEP, DEFAULT_MAX_ATTEMPTS};
use crate::provider::{binance, coinbase, coinbase_exchange, HttpConfig};
use crate::provider::{DEFAULT_REQUEST_TIMEOUT, DEFAULT_RESOURCE_TIMEOUT};
use crate::registry::{CircuitBreakerConfig, DEFAULT_VALID_PAIRS};

pub const DEFAULT_PRICE_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_ORDER_BOOK_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_ORDER_BOOK_DEPTH: u16 = binance::DEFAULT_DEPTH;

/// Shortest polling interval a feed accepts.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Base URLs for each provider. Override for tests or mirrors.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProviderEndpoints {
    pub coinbase: String,
    pub coinbase_exchange: String,
    pub binance: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            coinbase: coinbase::BASE_URL.to_string(),
            coinbase_exchange: coinbase_exchange::BASE_URL.to_string(),
            binance: binance::BASE_URL.to_string(),
        }
    }
}

/// Settings shared by every feed built from one [`FeedFactory`](crate::feed::FeedFactory).
///
/// Durations deserialize from (fractional) seconds:
///
/// ```
/// use pricefeed_market_data::config::FeedSettings;
///
/// let settings: FeedSettings =
///     serde_json::from_str(r#"{"maxAttempts": 5, "priceInterval": 0.2}"#).unwrap();
/// assert_eq!(settings.max_attempts, 5);
/// assert_eq!(settings.price_interval().as_secs(), 1);
/// ```
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeedSettings {
    pub valid_pairs: Vec<String>,
    pub allow_unlisted: bool,
    pub max_attempts: u32,
    #[serde(with = "secs")]
    pub backoff_step: Duration,
    #[serde(with = "secs")]
    pub price_interval: Duration,
    #[serde(with = "secs")]
    pub order_book_interval: Duration,
    pub order_book_depth: u16,
    #[serde(with = "secs")]
    pub request_timeout: Duration,
    #[serde(with = "secs")]
    pub resource_timeout: Duration,
    pub circuit_breaker: CircuitBreakerConfig,
    pub endpoints: ProviderEndpoints,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            valid_pairs: DEFAULT_VALID_PAIRS.iter().map(|s| s.to_string()).collect(),
            allow_unlisted: false,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_step: DEFAULT_BACKOFF_STEP,
            price_interval: DEFAULT_PRICE_INTERVAL,
            order_book_interval: DEFAULT_ORDER_BOOK_INTERVAL,
            order_book_depth: DEFAULT_ORDER_BOOK_DEPTH,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            resource_timeout: DEFAULT_RESOURCE_TIMEOUT,
            circuit_breaker: CircuitBreakerConfig::default(),
            endpoints: ProviderEndpoints::default(),
        }
    }
}

impl FeedSettings {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, self.backoff_step)
    }

    pub fn http_config(&self) -> HttpConfig {
        HttpConfig {
            request_timeout: self.request_timeout,
            resource_timeout: self.resource_timeout,
        }
    }

    /// Price feed interval, clamped to [`MIN_POLL_INTERVAL`].
    pub fn price_interval(&self) -> Duration {
        self.price_interval.max(MIN_POLL_INTERVAL)
    }

    /// Order book feed interval, clamped to [`MIN_POLL_INTERVAL`].
    pub fn order_book_interval(&self) -> Duration {
        self.order_book_interval.max(MIN_POLL_INTERVAL)
    }
}

/// `Duration` as a non-negative number of seconds.
pub(crate) mod secs {
    use std::time::Duration;

    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs)
            .map_err(|_| D::Error::custom(format!("invalid duration: {} seconds", secs)))
    }
}
