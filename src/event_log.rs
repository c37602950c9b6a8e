//! Event stream records and the bounded console log
//!
//! - EventRecord: one decoded push-channel message
//! - EventLevel: the backend's ten log levels
//! - EventLog: thread-safe bounded FIFO (capacity 300)

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Log levels emitted by the backend's push channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventLevel {
    Info,
    Warn,
    Error,
    Attack,
    Crack,
    Scan,
    Webscan,
    Netscan,
    Shell,
    Xp,
}

impl std::fmt::Display for EventLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Attack => "ATTACK",
            Self::Crack => "CRACK",
            Self::Scan => "SCAN",
            Self::Webscan => "WEBSCAN",
            Self::Netscan => "NETSCAN",
            Self::Shell => "SHELL",
            Self::Xp => "XP",
        };
        write!(f, "{name}")
    }
}

/// One decoded event from the push channel.
///
/// Transient: consumed once, appended to the bounded log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Epoch seconds (fractional, as the backend emits `time.time()`).
    pub ts: f64,
    pub level: EventLevel,
    pub msg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl EventRecord {
    /// True for the XP event the backend pushes on a level-up, which carries
    /// a `level_up` flag in its data payload.
    pub fn is_level_up(&self) -> bool {
        self.level == EventLevel::Xp
            && self
                .data
                .as_ref()
                .and_then(|d| d.get("level_up"))
                .and_then(Value::as_bool)
                .unwrap_or(false)
    }

    /// New level carried by a level-up event, if present.
    pub fn new_level(&self) -> Option<u32> {
        self.data
            .as_ref()
            .and_then(|d| d.get("level"))
            .and_then(Value::as_u64)
            .map(|l| l as u32)
    }

    /// New title carried by a level-up event, if present.
    pub fn new_title(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|d| d.get("title"))
            .and_then(Value::as_str)
    }
}

/// Thread-safe bounded FIFO of event records.
///
/// Single writer (the stream client), many readers. Appending beyond
/// capacity evicts the oldest entry so memory stays bounded however long
/// the console runs.
#[derive(Clone)]
pub struct EventLog {
    inner: Arc<RwLock<LogInner>>,
    capacity: usize,
}

#[derive(Default)]
struct LogInner {
    entries: VecDeque<EventRecord>,
    /// Total records ever appended, eviction included. Lets readers tail
    /// the log incrementally.
    appended: u64,
}

impl EventLog {
    /// Create a log with the given capacity (the console uses 300).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(LogInner {
                entries: VecDeque::with_capacity(capacity),
                appended: 0,
            })),
            capacity,
        }
    }

    /// Append a record, evicting the oldest entry once full.
    pub fn append(&self, record: EventRecord) {
        let mut inner = self.inner.write();
        if inner.entries.len() == self.capacity {
            inner.entries.pop_front();
        }
        inner.entries.push_back(record);
        inner.appended += 1;
    }

    /// Clone out all entries, oldest first.
    pub fn snapshot(&self) -> Vec<EventRecord> {
        self.inner.read().entries.iter().cloned().collect()
    }

    /// Total records ever appended, including evicted ones.
    pub fn total_appended(&self) -> u64 {
        self.inner.read().appended
    }

    /// Entries appended after the first `seen` appends and still retained,
    /// oldest first. Pairs with [`total_appended`](Self::total_appended)
    /// for incremental tailing.
    pub fn since(&self, seen: u64) -> Vec<EventRecord> {
        let inner = self.inner.read();
        let oldest_retained = inner.appended - inner.entries.len() as u64;
        let skip = seen.saturating_sub(oldest_retained) as usize;
        inner.entries.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
