//! Console configuration
//!
//! Defaults match the backend's local deployment; `PWRLVL_URL` overrides the
//! base URL (a `.env` file is honored via dotenvy in the binary).

use std::time::Duration;

/// Default backend address (the server binds 0.0.0.0:8999 locally).
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8999";

/// Fixed global status poll delay.
pub const STATUS_POLL_DELAY: Duration = Duration::from_millis(3000);

/// Delay before re-opening the event stream after a disconnect.
pub const STREAM_RETRY_DELAY: Duration = Duration::from_millis(3000);

/// Bounded event log capacity.
pub const EVENT_LOG_CAPACITY: usize = 300;

/// Configuration for a [`Console`](crate::console::Console) instance.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Backend base URL, no trailing slash.
    pub base_url: String,
    /// Delay between status poll completions.
    pub poll_interval: Duration,
    /// Reconnect delay for the event stream.
    pub stream_retry: Duration,
    /// Maximum retained event log entries.
    pub log_capacity: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: STATUS_POLL_DELAY,
            stream_retry: STREAM_RETRY_DELAY,
            log_capacity: EVENT_LOG_CAPACITY,
        }
    }
}

impl ConsoleConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("PWRLVL_URL") {
            if !url.is_empty() {
                config.base_url = url;
            }
        }
        config.normalize()
    }

    /// Override the base URL (CLI flag wins over env).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self.normalize()
    }

    fn normalize(mut self) -> Self {
        while self.base_url.ends_with('/') {
            self.base_url.pop();
        }
        self
    }
}
