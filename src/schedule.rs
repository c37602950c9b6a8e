//! Cancellable repeating-task primitive
//!
//! One abstraction backs both the never-cancelled global status poller and
//! the per-view refresh loops, so the timer logic lives in one place. The
//! delay is measured from tick completion to the next tick start — ticks
//! never overlap.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// When the first tick fires relative to `spawn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstTick {
    /// Run the task immediately, then wait the period between ticks
    /// (the status poller's fetch-then-wait shape).
    Immediate,
    /// Wait one period before the first tick (interval-timer shape used by
    /// view-local refresh loops).
    AfterPeriod,
}

/// Handle to a spawned repeating task.
///
/// Owned by whoever started it; a view creates one in `on_activate` and
/// must cancel it in `on_deactivate`. Dropping the handle aborts the task
/// so an orphaned timer cannot outlive its owner.
#[derive(Debug)]
pub struct RepeatingTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl RepeatingTask {
    /// Spawn a task that runs `tick()` to completion, sleeps `period`, and
    /// repeats until cancelled.
    pub fn spawn<F, Fut>(period: Duration, first: FirstTick, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let token = CancellationToken::new();
        let child = token.clone();
        let handle = tokio::spawn(async move {
            if first == FirstTick::AfterPeriod {
                tokio::select! {
                    biased;
                    _ = child.cancelled() => return,
                    _ = tokio::time::sleep(period) => {}
                }
            }
            loop {
                // The biased select checks the token before polling the tick,
                // and cancellation also wins against a mid-flight tick at its
                // next await point: after cancel() returns, no tick fires.
                tokio::select! {
                    biased;
                    _ = child.cancelled() => return,
                    _ = tick() => {}
                }
                tokio::select! {
                    biased;
                    _ = child.cancelled() => return,
                    _ = tokio::time::sleep(period) => {}
                }
            }
        });
        Self { token, handle }
    }

    /// Stop the loop. No tick fires after this returns; cancelling twice is
    /// harmless.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for RepeatingTask {
    fn drop(&mut self) {
        self.token.cancel();
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn immediate_first_tick_runs_before_any_delay() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let task = RepeatingTask::spawn(Duration::from_secs(3), FirstTick::Immediate, move || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
        task.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn after_period_waits_one_period_first() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let task = RepeatingTask::spawn(Duration::from_secs(4), FirstTick::AfterPeriod, move || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        task.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_immediately_after_spawn_observes_no_ticks() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let task = RepeatingTask::spawn(Duration::from_millis(100), FirstTick::AfterPeriod, move || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
        });

        task.cancel();
        assert!(task.is_cancelled());

        // Advance far past many would-be ticks: none may fire.
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_future_ticks_after_some_ran() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let task = RepeatingTask::spawn(Duration::from_secs(1), FirstTick::Immediate, move || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(2500)).await;
        let before = count.load(Ordering::SeqCst);
        assert!(before >= 2);

        task.cancel();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(count.load(Ordering::SeqCst), before);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_never_overlap_even_when_slow() {
        // A tick slower than the period: the next tick starts only after the
        // previous one (and its downstream work) completed.
        let running = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));
        let r = running.clone();
        let m = max_seen.clone();
        let task = RepeatingTask::spawn(Duration::from_millis(100), FirstTick::Immediate, move || {
            let r = r.clone();
            let m = m.clone();
            async move {
                let now = r.fetch_add(1, Ordering::SeqCst) + 1;
                m.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(1)).await;
                r.fetch_sub(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_secs(10)).await;
        task.cancel();
        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }
}
