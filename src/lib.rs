//! pwrlvl-console - client control plane for the PWRLVL9000 operator console
//!
//! The orchestration layer every view shares: the tab lifecycle state
//! machine, the persistent event stream consumer, the periodic status
//! synchronization loop, and the XP/level tracker fed by both.

pub mod api;
pub mod config;
pub mod console;
pub mod error;
pub mod event_log;
pub mod poller;
pub mod progression;
pub mod schedule;
pub mod status;
pub mod stream;
pub mod tabs;

pub use api::ApiClient;
pub use config::ConsoleConfig;
pub use console::Console;
pub use error::ConsoleError;
pub use event_log::{EventLevel, EventLog, EventRecord};
pub use progression::{Activity, ProgressionState, ProgressionTracker, XpReadout};
pub use schedule::{FirstTick, RepeatingTask};
pub use status::{SharedStatus, StatusSnapshot};
pub use stream::{spawn_event_stream, DurableSubscription, EventStreamHandle, SseSubscription};
pub use tabs::{shared_router, SharedRouter, TabRegistry, TabRouter, View};
