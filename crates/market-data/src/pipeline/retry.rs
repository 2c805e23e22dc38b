//! Bounded retry with linear backoff.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use super::FetchOutcome;
use crate::errors::MarketDataError;

/// Default number of attempts per provider.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default backoff unit. Attempt `n` is followed by a `n * step` pause.
pub const DEFAULT_BACKOFF_STEP: Duration = Duration::from_secs(2);

/// Retries `Retriable` outcomes of a single operation.
///
/// - `Success` and `Fatal` return immediately.
/// - `Retriable` sleeps `attempt * backoff_step` (2s, 4s, ... by default)
///   and tries again while attempts remain.
/// - A `Retriable` on the last attempt is returned as `Fatal`.
///
/// Sleeping uses the Tokio timer, so other tasks keep running meanwhile.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BACKOFF_STEP)
    }
}

impl RetryPolicy {
    /// `max_attempts` below 1 is treated as 1.
    pub fn new(max_attempts: u32, backoff_step: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_step,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff_step(&self) -> Duration {
        self.backoff_step
    }

    /// Same backoff, different attempt budget.
    pub fn with_max_attempts(&self, max_attempts: u32) -> Self {
        Self::new(max_attempts, self.backoff_step)
    }

    /// Pause after the given (1-based) attempt.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff_step * attempt
    }

    /// Run `op` until it succeeds, fails fatally, or attempts run out.
    ///
    /// `op` receives the 1-based attempt number.
    pub async fn execute<T, F, Fut>(&self, mut op: F) -> FetchOutcome<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = FetchOutcome<T>>,
    {
        let mut attempt = 1;

        loop {
            match op(attempt).await {
                FetchOutcome::Retriable(e) if attempt < self.max_attempts => {
                    let delay = self.backoff_for(attempt);
                    debug!(
                        "Attempt {}/{} failed ({}), retrying in {:?}",
                        attempt, self.max_attempts, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                FetchOutcome::Retriable(e) => {
                    warn!("Giving up after {} attempt(s): {}", attempt, e);
                    return FetchOutcome::Fatal(e);
                }
                outcome => return outcome,
            }
        }
    }

    /// [`execute`](Self::execute) for operations that return a plain `Result`.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> FetchOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, MarketDataError>>,
    {
        self.execute(|_| {
            let fut = op();
            async move { FetchOutcome::from(fut.await) }
        })
        .await
    }
}
