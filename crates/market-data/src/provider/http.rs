//! Shared HTTP plumbing for provider adapters.
//!
//! Every adapter performs a single GET and needs the same classification of
//! the transport and HTTP result, so it lives here once.

use std::str::FromStr;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::errors::MarketDataError;
use crate::models::BookLevel;

/// Default time allowed to connect, and between reads once connected.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default time allowed for the whole round trip, body included.
pub const DEFAULT_RESOURCE_TIMEOUT: Duration = Duration::from_secs(15);

/// Timeouts applied to every provider request.
#[derive(Clone, Debug, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_request_timeout", with = "crate::config::secs")]
    pub request_timeout: Duration,
    #[serde(default = "default_resource_timeout", with = "crate::config::secs")]
    pub resource_timeout: Duration,
}

fn default_request_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

fn default_resource_timeout() -> Duration {
    DEFAULT_RESOURCE_TIMEOUT
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            resource_timeout: DEFAULT_RESOURCE_TIMEOUT,
        }
    }
}

/// A provider endpoint: one client, one base URL, one provider id.
#[derive(Clone, Debug)]
pub struct HttpSource {
    client: Client,
    base_url: String,
    provider: &'static str,
    resource_timeout: Duration,
}

impl HttpSource {
    /// Every request is bounded by `config.resource_timeout` even if the
    /// configured client cannot be built.
    pub fn new(provider: &'static str, base_url: impl Into<String>, config: &HttpConfig) -> Self {
        let client = Client::builder()
            .connect_timeout(config.request_timeout)
            .read_timeout(config.request_timeout)
            .timeout(config.resource_timeout)
            .build()
            .unwrap_or_else(|e| {
                error!(
                    "{} HTTP client setup failed ({}), using defaults with a {:?} request limit",
                    provider, e, config.resource_timeout
                );
                Client::new()
            });

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            provider,
            resource_timeout: config.resource_timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn resource_timeout(&self) -> Duration {
        self.resource_timeout
    }

    /// GET `path` and decode the JSON body into `T`.
    ///
    /// `resource` names what was asked for (usually the pair) and is only
    /// used in `InvalidResource` errors.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        resource: &str,
    ) -> Result<T, MarketDataError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} request: {} {:?}", self.provider, url, query);

        let response = self
            .client
            .get(&url)
            .query(query)
            .timeout(self.resource_timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.status_error(status, &body, resource));
        }

        let text = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        decode(self.provider, &text)
    }

    fn transport_error(&self, e: reqwest::Error) -> MarketDataError {
        if e.is_timeout() {
            MarketDataError::Timeout {
                provider: self.provider.to_string(),
            }
        } else {
            MarketDataError::Transient {
                provider: self.provider.to_string(),
                message: format!("Request failed: {}", e),
            }
        }
    }

    fn status_error(&self, status: StatusCode, body: &str, resource: &str) -> MarketDataError {
        warn!("{} returned HTTP {}: {}", self.provider, status, body);

        match status {
            StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => MarketDataError::InvalidResource {
                provider: self.provider.to_string(),
                resource: resource.to_string(),
            },
            StatusCode::TOO_MANY_REQUESTS => MarketDataError::RateLimited {
                provider: self.provider.to_string(),
            },
            _ => MarketDataError::Transient {
                provider: self.provider.to_string(),
                message: format!("HTTP {}", status),
            },
        }
    }
}

/// Decode a response body in two steps: a body that is not JSON at all is a
/// transient glitch, while JSON of the wrong shape is a malformed payload.
pub(crate) fn decode<T: DeserializeOwned>(provider: &str, text: &str) -> Result<T, MarketDataError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| MarketDataError::Transient {
            provider: provider.to_string(),
            message: format!("Invalid JSON: {}", e),
        })?;

    serde_json::from_value(value).map_err(|e| MarketDataError::MalformedPayload {
        provider: provider.to_string(),
        message: e.to_string(),
    })
}

/// Parse a decimal string field from a provider payload.
pub(crate) fn parse_decimal(
    provider: &str,
    field: &str,
    raw: &str,
) -> Result<Decimal, MarketDataError> {
    Decimal::from_str(raw.trim())
        .or_else(|_| Decimal::from_scientific(raw.trim()))
        .map_err(|_| MarketDataError::MalformedPayload {
            provider: provider.to_string(),
            message: format!("Invalid decimal in '{}': {}", field, raw),
        })
}

/// Parse one `[price, quantity, ...]` book entry. Exchanges send the numbers
/// as strings, trailing elements (order counts, ids) are ignored.
pub(crate) fn parse_level(
    provider: &str,
    entry: &[serde_json::Value],
) -> Result<BookLevel, MarketDataError> {
    let field = |index: usize, name: &str| -> Result<Decimal, MarketDataError> {
        match entry.get(index) {
            Some(serde_json::Value::String(raw)) => parse_decimal(provider, name, raw),
            Some(serde_json::Value::Number(raw)) => parse_decimal(provider, name, &raw.to_string()),
            _ => Err(MarketDataError::MalformedPayload {
                provider: provider.to_string(),
                message: format!("Book entry missing {}: {:?}", name, entry),
            }),
        }
    };

    Ok(BookLevel::new(field(0, "price")?, field(1, "quantity")?))
}
