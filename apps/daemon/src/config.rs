use std::str::FromStr;
use std::time::Duration;

use pricefeed_market_data::{FeedSettings, TradingPair};

const DEFAULT_PAIR: &str = "BTC-USD";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    pub fn from_env() -> Self {
        Self::parse(std::env::var("PF_LOG_FORMAT").ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

pub struct Config {
    pub pair: TradingPair,
    pub feed: FeedSettings,
}

impl Config {
    /// Reads `PF_*` variables. Call after `dotenvy::dotenv()` and tracing
    /// setup so malformed values can be reported.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = FeedSettings::default();
        let pair: TradingPair = parse_or(
            "PF_PAIR",
            lookup("PF_PAIR"),
            DEFAULT_PAIR.parse::<TradingPair>()?,
        );

        let valid_pairs = lookup("PF_VALID_PAIRS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| defaults.valid_pairs.clone());

        let mut endpoints = defaults.endpoints.clone();
        if let Some(url) = lookup("PF_COINBASE_URL") {
            endpoints.coinbase = url;
        }
        if let Some(url) = lookup("PF_COINBASE_EXCHANGE_URL") {
            endpoints.coinbase_exchange = url;
        }
        if let Some(url) = lookup("PF_BINANCE_URL") {
            endpoints.binance = url;
        }

        let feed = FeedSettings {
            valid_pairs,
            allow_unlisted: parse_or(
                "PF_ALLOW_UNLISTED",
                lookup("PF_ALLOW_UNLISTED"),
                defaults.allow_unlisted,
            ),
            max_attempts: parse_or(
                "PF_MAX_ATTEMPTS",
                lookup("PF_MAX_ATTEMPTS"),
                defaults.max_attempts,
            ),
            price_interval: secs_or(
                "PF_PRICE_INTERVAL_SECS",
                lookup("PF_PRICE_INTERVAL_SECS"),
                defaults.price_interval,
            ),
            order_book_interval: secs_or(
                "PF_ORDER_BOOK_INTERVAL_SECS",
                lookup("PF_ORDER_BOOK_INTERVAL_SECS"),
                defaults.order_book_interval,
            ),
            endpoints,
            ..defaults
        };

        Ok(Self {
            pair,
            feed,
        })
    }
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> T {
    let Some(raw) = raw else {
        return default;
    };
    raw.trim().parse().unwrap_or_else(|_| {
        tracing::warn!("Invalid {}='{}', using default", key, raw);
        default
    })
}

fn secs_or(key: &str, raw: Option<String>, default: Duration) -> Duration {
    Duration::from_secs(parse_or(key, raw, default.as_secs()))
}
