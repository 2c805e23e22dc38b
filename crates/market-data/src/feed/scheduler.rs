//! Cancellable recurring task.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

/// A spawned loop that runs `job` immediately and then every `period`.
///
/// The next run starts only after the previous one finished; ticks missed
/// while a run was in progress are skipped, not replayed. Cancelling aborts
/// the task, dropping any run at its next await point. Dropping the handle
/// cancels too.
#[derive(Debug)]
pub struct ScheduledTask {
    name: String,
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    pub fn every<F, Fut>(name: impl Into<String>, period: Duration, mut job: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let task_name = name.clone();

        let handle = tokio::spawn(async move {
            debug!("Scheduled task '{}' started ({:?} interval)", task_name, period);
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                job().await;
            }
        });

        Self { name, handle }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cancel(&self) {
        if !self.handle.is_finished() {
            debug!("Cancelling scheduled task '{}'", self.name);
            self.handle.abort();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn counting_task(period: Duration, work: Duration) -> (ScheduledTask, Arc<AtomicU32>) {
        let runs = Arc::new(AtomicU32::new(0));
        let counter = runs.clone();
        let task = ScheduledTask::every("test", period, move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(work).await;
            }
        });
        (task, runs)
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_immediately_then_every_period() {
        let (_task, runs) = counting_task(Duration::from_secs(5), Duration::ZERO);

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_runs_never_overlap() {
        // Each run takes 12s against a 5s period.
        let (_task, runs) = counting_task(Duration::from_secs(5), Duration::from_secs(12));

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        // Missed ticks collapse into one run once the first finishes.
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_runs() {
        let (task, runs) = counting_task(Duration::from_secs(1), Duration::ZERO);
        tokio::time::sleep(Duration::from_millis(1)).await;

        task.cancel();
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(task.is_finished());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let (task, runs) = counting_task(Duration::from_secs(1), Duration::ZERO);
        tokio::time::sleep(Duration::from_millis(1)).await;
        drop(task);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }
}
