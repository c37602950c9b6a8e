//! Global status poller
//!
//! Fetch a snapshot, replace the shared state, notify the tracker and the
//! active view, wait 3 s, repeat, success or not. A failed fetch skips the
//! update but the loop still reschedules at the same cadence; no back-off.

use std::time::Duration;

use crate::api::ApiClient;
use crate::progression::ProgressionTracker;
use crate::schedule::{FirstTick, RepeatingTask};
use crate::status::SharedStatus;
use crate::tabs::SharedRouter;

/// Spawn the status poll loop. The first fetch fires immediately; each
/// subsequent fetch is scheduled only after the previous tick's downstream
/// notification completed, so polls never overlap.
///
/// The returned handle is held for the process lifetime and only dropped at
/// shutdown.
pub fn spawn_status_poller(
    api: ApiClient,
    status: SharedStatus,
    tracker: ProgressionTracker,
    router: SharedRouter,
    delay: Duration,
) -> RepeatingTask {
    RepeatingTask::spawn(delay, FirstTick::Immediate, move || {
        let api = api.clone();
        let status = status.clone();
        let tracker = tracker.clone();
        let router = router.clone();
        async move {
            let Some(snapshot) = api.fetch_status().await else {
                tracing::debug!("status poll yielded no result");
                return;
            };
            status.replace(snapshot.clone());
            tracker.observe_snapshot(&snapshot);
            // Delivered to whichever view is active at fetch completion —
            // a switch mid-fetch redirects this snapshot, it is not dropped.
            router.lock().dispatch_status(&snapshot);
        }
    })
}
