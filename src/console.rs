//! Console context - explicit owner of all shared state
//!
//! The active tab, the latest status snapshot, the log buffer, and the
//! progression tracker all live here, built once and passed around. No
//! ambient singletons.

use crate::api::ApiClient;
use crate::config::ConsoleConfig;
use crate::event_log::EventLog;
use crate::progression::ProgressionTracker;
use crate::schedule::RepeatingTask;
use crate::status::SharedStatus;
use crate::stream::{spawn_event_stream, EventStreamHandle, SseSubscription};
use crate::tabs::{shared_router, SharedRouter, View};

/// One operator console bound to one backend.
#[derive(Debug)]
pub struct Console {
    config: ConsoleConfig,
    api: ApiClient,
    status: SharedStatus,
    log: EventLog,
    tracker: ProgressionTracker,
    router: SharedRouter,
}

impl Console {
    pub fn new(config: ConsoleConfig) -> Self {
        let api = ApiClient::new(config.base_url.clone());
        Self {
            api,
            status: SharedStatus::new(),
            log: EventLog::with_capacity(config.log_capacity),
            tracker: ProgressionTracker::new(),
            router: shared_router(),
            config,
        }
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn api(&self) -> ApiClient {
        self.api.clone()
    }

    pub fn status(&self) -> SharedStatus {
        self.status.clone()
    }

    pub fn log(&self) -> EventLog {
        self.log.clone()
    }

    pub fn tracker(&self) -> ProgressionTracker {
        self.tracker.clone()
    }

    pub fn router(&self) -> SharedRouter {
        self.router.clone()
    }

    /// Register a view and immediately make it active.
    pub fn open_view(&self, name: &str, view: Box<dyn View>) {
        let mut router = self.router.lock();
        router.register(name, view);
        router.switch_to(name);
    }

    /// Start the global status poll loop (3 s cadence, never cancelled in
    /// normal operation — hold the handle until shutdown).
    pub fn spawn_status_poller(&self) -> RepeatingTask {
        crate::poller::spawn_status_poller(
            self.api.clone(),
            self.status.clone(),
            self.tracker.clone(),
            self.router.clone(),
            self.config.poll_interval,
        )
    }

    /// Start the persistent event stream consumer.
    pub fn spawn_event_stream(&self) -> EventStreamHandle {
        let subscription = SseSubscription::new(&self.config.base_url, self.config.stream_retry);
        spawn_event_stream(subscription, self.log.clone(), self.tracker.clone())
    }
}
