//! Per-fetch diagnostics: what each provider in a chain did.

use crate::models::ProviderId;

/// Why a provider was not asked at all.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Circuit breaker is open for this provider.
    CircuitBreakerOpen,
}

/// One provider's part in a fetch.
#[derive(Clone, Debug)]
pub struct ProviderAttempt {
    pub provider_id: ProviderId,
    /// Requests actually sent, retries included.
    pub attempts: u32,
    pub skipped: Option<SkipReason>,
    pub error: Option<String>,
    pub success: bool,
}

#[derive(Clone, Debug, Default)]
pub struct FetchDiagnostics {
    pub attempts: Vec<ProviderAttempt>,
}

impl FetchDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_skip(&mut self, provider_id: ProviderId, reason: SkipReason) {
        self.attempts.push(ProviderAttempt {
            provider_id,
            attempts: 0,
            skipped: Some(reason),
            error: None,
            success: false,
        });
    }

    pub fn record_error(&mut self, provider_id: ProviderId, attempts: u32, error: String) {
        self.attempts.push(ProviderAttempt {
            provider_id,
            attempts,
            skipped: None,
            error: Some(error),
            success: false,
        });
    }

    pub fn record_success(&mut self, provider_id: ProviderId, attempts: u32) {
        self.attempts.push(ProviderAttempt {
            provider_id,
            attempts,
            skipped: None,
            error: None,
            success: true,
        });
    }

    /// One line for logs, e.g. `A: ERROR x3 (Timeout) -> B: SUCCESS x1`.
    pub fn summary(&self) -> String {
        self.attempts
            .iter()
            .map(|a| match (&a.skipped, &a.error) {
                _ if a.success => format!("{}: SUCCESS x{}", a.provider_id, a.attempts),
                (Some(skip), _) => format!("{}: SKIPPED ({:?})", a.provider_id, skip),
                (None, Some(err)) => {
                    format!("{}: ERROR x{} ({})", a.provider_id, a.attempts, err)
                }
                (None, None) => format!("{}: UNKNOWN", a.provider_id),
            })
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    pub fn has_success(&self) -> bool {
        self.attempts.iter().any(|a| a.success)
    }

    /// Requests sent across every provider.
    pub fn total_requests(&self) -> u32 {
        self.attempts.iter().map(|a| a.attempts).sum()
    }

    pub fn skip_reasons(&self) -> Vec<(&ProviderId, &SkipReason)> {
        self.attempts
            .iter()
            .filter_map(|a| a.skipped.as_ref().map(|s| (&a.provider_id, s)))
            .collect()
    }

    pub fn errors(&self) -> Vec<(&ProviderId, &str)> {
        self.attempts
            .iter()
            .filter_map(|a| a.error.as_ref().map(|e| (&a.provider_id, e.as_str())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::*;

    #[test]
    fn test_summary_and_totals() {
        let mut diag = FetchDiagnostics::new();
        diag.record_skip(Cow::Borrowed("COINBASE"), SkipReason::CircuitBreakerOpen);
        diag.record_error(Cow::Borrowed("COINBASE_EXCHANGE"), 3, "Timeout".to_string());
        diag.record_success(Cow::Borrowed("BINANCE"), 1);

        assert_eq!(
            diag.summary(),
            "COINBASE: SKIPPED (CircuitBreakerOpen) -> COINBASE_EXCHANGE: ERROR x3 (Timeout) -> BINANCE: SUCCESS x1"
        );
        assert_eq!(diag.total_requests(), 4);
        assert!(diag.has_success());
        assert_eq!(diag.skip_reasons().len(), 1);
        assert_eq!(diag.errors().len(), 1);
    }
}
