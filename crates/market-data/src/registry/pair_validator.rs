//! Local allow-list for trading pairs.
//!
//! Rejected pairs never reach the network. Each rejected pair is reported
//! with a single warning for the lifetime of the validator; repeated checks
//! for the same pair are silent.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use log::warn;

use crate::models::TradingPair;

/// Pairs served when no explicit list is configured.
pub const DEFAULT_VALID_PAIRS: &[&str] = &[
    "BTC-USD", "ETH-USD", "SOL-USD", "ADA-USD", "XRP-USD", "DOGE-USD", "LTC-USD", "DOT-USD",
    "AVAX-USD", "LINK-USD", "MATIC-USD", "BCH-USD", "UNI-USD", "ATOM-USD", "XLM-USD", "BTC-EUR",
    "ETH-EUR", "BTC-GBP", "ETH-GBP", "ETH-BTC",
];

/// Canonical pair strings known to exist upstream. Immutable once built.
#[derive(Clone, Debug, Default)]
pub struct ValidPairSet {
    pairs: HashSet<String>,
}

impl ValidPairSet {
    /// Entries that do not parse as a pair are dropped with a warning.
    pub fn new<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let pairs = pairs
            .into_iter()
            .filter_map(|raw| match raw.as_ref().parse::<TradingPair>() {
                Ok(pair) => Some(pair.canonical()),
                Err(e) => {
                    warn!("Ignoring entry '{}' in valid pair list: {}", raw.as_ref(), e);
                    None
                }
            })
            .collect();

        Self { pairs }
    }

    pub fn default_pairs() -> Self {
        Self::new(DEFAULT_VALID_PAIRS)
    }

    pub fn contains(&self, pair: &TradingPair) -> bool {
        self.pairs.contains(&pair.canonical())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Result of a validation check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PairCheck {
    Allowed,
    /// `first_report` is true only the first time this pair was rejected.
    Rejected { first_report: bool },
}

impl PairCheck {
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Filters pairs against a [`ValidPairSet`] and deduplicates rejection logs.
///
/// Shared behind an `Arc` by every feed and fetcher built from the same
/// settings.
#[derive(Debug)]
pub struct PairValidator {
    valid: ValidPairSet,
    allow_unlisted: bool,
    logged_invalid: Mutex<HashSet<String>>,
}

impl PairValidator {
    pub fn new(valid: ValidPairSet, allow_unlisted: bool) -> Self {
        Self {
            valid,
            allow_unlisted,
            logged_invalid: Mutex::new(HashSet::new()),
        }
    }

    pub fn allow_unlisted(&self) -> bool {
        self.allow_unlisted
    }

    pub fn valid_pairs(&self) -> &ValidPairSet {
        &self.valid
    }

    fn lock_logged(&self) -> MutexGuard<'_, HashSet<String>> {
        self.logged_invalid
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Check using the validator's own `allow_unlisted` flag.
    pub fn check(&self, pair: &TradingPair) -> PairCheck {
        self.check_with(pair, self.allow_unlisted)
    }

    /// Check with a per-call `allow_unlisted` override.
    pub fn check_with(&self, pair: &TradingPair, allow_unlisted: bool) -> PairCheck {
        if allow_unlisted || self.valid.contains(pair) {
            return PairCheck::Allowed;
        }

        let canonical = pair.canonical();
        let first_report = self.lock_logged().insert(canonical.clone());
        if first_report {
            warn!(
                "Trading pair {} is not in the list of valid pairs, skipping",
                canonical
            );
        }

        PairCheck::Rejected { first_report }
    }

    pub fn check_allowed(&self, pair: &TradingPair) -> bool {
        self.check(pair).is_allowed()
    }

    /// Pure lookup. Never logs or touches the invalid-pair cache.
    pub fn is_allowed(&self, pair: &TradingPair) -> bool {
        self.allow_unlisted || self.valid.contains(pair)
    }

    /// Number of distinct pairs reported as invalid so far.
    pub fn logged_invalid_count(&self) -> usize {
        self.lock_logged().len()
    }
}

impl Default for PairValidator {
    fn default() -> Self {
        Self::new(ValidPairSet::default_pairs(), false)
    }
}
