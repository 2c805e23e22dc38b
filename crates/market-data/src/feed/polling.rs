//! Recurring fetch for one target at a time.
//!
//! ```text
//!            start(pair)              retarget(other)
//!   Idle ------------------> Polling ----------------> Polling(other)
//!    ^                         |  ^
//!    |        stop()           |  | tick: fetch -> settle -> publish
//!    +-------------------------+  +----------------------+
//! ```
//!
//! Every start, retarget, refresh and stop opens a new *epoch*. A fetch
//! carries the epoch it was started in and may only publish while that
//! epoch is current. The check and the publish happen under the same lock
//! that opens epochs, so a result for an old target can never land after
//! the switch, even when the old task has not yet noticed it was aborted.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::scheduler::ScheduledTask;
use super::snapshot::{FeedError, FeedSnapshot};
use crate::errors::{ErrorKind, MarketDataError};
use crate::models::TradingPair;
use crate::pipeline::{FeedSource, FetchOutcome};

struct Control {
    epoch: u64,
    target: Option<TradingPair>,
    task: Option<ScheduledTask>,
}

struct FeedInner<S: FeedSource> {
    name: String,
    source: S,
    interval: Duration,
    control: Mutex<Control>,
    tx: watch::Sender<FeedSnapshot<S::Output>>,
}

/// Polls a [`FeedSource`] for the current target and publishes each settled
/// result as a [`FeedSnapshot`].
///
/// - At most one fetch is in flight; the next tick waits for it.
/// - `stop` and `retarget` return immediately. Work for the old epoch is
///   aborted and anything it still produces is dropped.
/// - A failed fetch keeps the last good value and attaches the error.
/// - Retargeting to a different pair clears value and error.
///
/// Must be used inside a Tokio runtime.
pub struct PollingFeed<S: FeedSource> {
    inner: Arc<FeedInner<S>>,
}

impl<S: FeedSource> PollingFeed<S> {
    pub fn new(name: impl Into<String>, source: S, interval: Duration) -> Self {
        let (tx, _rx) = watch::channel(FeedSnapshot::default());
        Self {
            inner: Arc::new(FeedInner {
                name: name.into(),
                source,
                interval,
                control: Mutex::new(Control {
                    epoch: 0,
                    target: None,
                    task: None,
                }),
                tx,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn interval(&self) -> Duration {
        self.inner.interval
    }

    pub fn source(&self) -> &S {
        &self.inner.source
    }

    /// Begin polling `pair`. Replaces whatever was being polled before.
    pub fn start(&self, pair: TradingPair) {
        let mut control = self.inner.lock_control();
        self.inner.begin(&mut control, pair);
    }

    /// Stop polling. Nothing is published for the stopped epoch afterwards.
    pub fn stop(&self) {
        let mut control = self.inner.lock_control();
        self.inner.halt(&mut control);
    }

    /// Switch to `pair`: `stop` followed by `start`, as one step.
    pub fn retarget(&self, pair: TradingPair) {
        let mut control = self.inner.lock_control();
        info!(
            "{} feed retargeting {} -> {}",
            self.inner.name,
            control
                .target
                .as_ref()
                .map(|p| p.canonical())
                .unwrap_or_else(|| "-".to_string()),
            pair
        );
        self.inner.begin(&mut control, pair);
    }

    /// Fetch the current target now and restart the interval from here.
    ///
    /// Returns `false`, doing nothing, when the feed is not polling.
    pub fn refresh(&self) -> bool {
        let mut control = self.inner.lock_control();
        let pair = match (&control.task, &control.target) {
            (Some(_), Some(pair)) => pair.clone(),
            _ => return false,
        };
        self.inner.begin(&mut control, pair);
        true
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot<S::Output>> {
        self.inner.tx.subscribe()
    }

    pub fn snapshot(&self) -> FeedSnapshot<S::Output> {
        self.inner.tx.borrow().clone()
    }

    pub fn target(&self) -> Option<TradingPair> {
        self.inner.lock_control().target.clone()
    }

    pub fn is_polling(&self) -> bool {
        self.inner.lock_control().task.is_some()
    }
}

impl<S: FeedSource> Drop for PollingFeed<S> {
    fn drop(&mut self) {
        // The task holds the inner state; cancel it so both can go.
        if let Some(task) = self.inner.lock_control().task.take() {
            task.cancel();
        }
    }
}

impl<S: FeedSource> FeedInner<S> {
    fn lock_control(&self) -> MutexGuard<'_, Control> {
        self.control
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin(self: &Arc<Self>, control: &mut Control, pair: TradingPair) {
        self.halt(control);

        let same_target = control.target.as_ref() == Some(&pair);
        control.target = Some(pair.clone());
        let epoch = control.epoch;

        self.tx.send_modify(|snapshot| {
            if !same_target {
                snapshot.value = None;
                snapshot.error = None;
                snapshot.updated_at = None;
            }
            snapshot.target = Some(pair.clone());
            snapshot.is_polling = true;
            snapshot.is_loading = false;
        });

        debug!(
            "{} feed polling {} every {:?} (epoch {})",
            self.name, pair, self.interval, epoch
        );

        let inner = Arc::clone(self);
        control.task = Some(ScheduledTask::every(
            format!("{}:{}", self.name, pair),
            self.interval,
            move || {
                let inner = Arc::clone(&inner);
                let pair = pair.clone();
                async move { inner.poll_once(epoch, &pair).await }
            },
        ));
    }

    fn halt(&self, control: &mut Control) {
        control.epoch += 1;
        if let Some(task) = control.task.take() {
            task.cancel();
        }
        self.tx.send_if_modified(|snapshot| {
            let changed = snapshot.is_polling || snapshot.is_loading;
            snapshot.is_polling = false;
            snapshot.is_loading = false;
            changed
        });
    }

    async fn poll_once(&self, epoch: u64, pair: &TradingPair) {
        {
            let control = self.lock_control();
            if control.epoch != epoch {
                return;
            }
            self.tx.send_if_modified(|snapshot| {
                let changed = !snapshot.is_loading;
                snapshot.is_loading = true;
                changed
            });
        }

        let outcome = self.source.fetch(pair).await;

        let control = self.lock_control();
        if control.epoch != epoch {
            debug!(
                "{} feed dropping result for {} from epoch {} (now {})",
                self.name, pair, epoch, control.epoch
            );
            return;
        }

        match outcome {
            FetchOutcome::Success(value) => {
                self.tx.send_modify(|snapshot| {
                    snapshot.value = Some(value);
                    snapshot.error = None;
                    snapshot.is_loading = false;
                    snapshot.updated_at = Some(Utc::now());
                });
            }
            FetchOutcome::Retriable(error) | FetchOutcome::Fatal(error) => {
                self.log_failure(pair, &error);
                self.tx.send_modify(|snapshot| {
                    snapshot.error = Some(FeedError::from(&error));
                    snapshot.is_loading = false;
                    snapshot.updated_at = Some(Utc::now());
                });
            }
        }
    }

    fn log_failure(&self, pair: &TradingPair, error: &MarketDataError) {
        match error.kind() {
            // Already reported once by the validator.
            ErrorKind::RejectedByPolicy => {}
            ErrorKind::InvalidResource => warn!(
                "{} feed: {} is not available from {}",
                self.name,
                pair,
                error.provider().unwrap_or("any provider")
            ),
            _ => warn!("{} feed: fetch for {} failed: {}", self.name, pair, error),
        }
    }
}
