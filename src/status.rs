//! Status snapshot - the full-replace state fetched on each poll tick
//!
//! Every field is optional on the wire; decoding fills defaults so older
//! backends that omit the newer tool flags still produce a usable snapshot.
//! A snapshot is always replaced wholesale, never merged with the previous
//! one.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Global status as reported by `GET /api/status`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusSnapshot {
    // Running-operation flags
    pub wifi_scanning: bool,
    pub wifi_attacking: bool,
    pub web_scanning: bool,
    pub net_scanning: bool,
    pub probe_running: bool,
    pub pmkid_running: bool,
    pub beacon_running: bool,
    pub rogueap_running: bool,
    pub wps_scanning: bool,
    pub wps_attacking: bool,
    pub capturing: bool,

    // Current targets
    pub attack_bssid: Option<String>,
    pub attack_iface: Option<String>,
    pub scan_iface: Option<String>,
    pub rogueap_ssid: Option<String>,
    pub wps_target: Option<String>,

    pub interfaces: Vec<String>,

    // Progression fields
    pub xp: u64,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default = "default_title")]
    pub title: String,
    /// Absent means max level reached.
    pub xp_next: Option<u64>,
}

fn default_level() -> u32 {
    1
}

fn default_title() -> String {
    "APPRENTICE".to_string()
}

impl StatusSnapshot {
    /// True if any operation the backend tracks is currently running.
    pub fn any_running(&self) -> bool {
        self.wifi_scanning
            || self.wifi_attacking
            || self.web_scanning
            || self.net_scanning
            || self.probe_running
            || self.pmkid_running
            || self.beacon_running
            || self.rogueap_running
            || self.wps_scanning
            || self.wps_attacking
            || self.capturing
    }
}

/// Latest snapshot, shared single-writer/many-reader.
///
/// The status poller is the only writer; everyone else reads clones.
#[derive(Clone, Default)]
pub struct SharedStatus {
    inner: Arc<RwLock<Option<StatusSnapshot>>>,
}

impl SharedStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot wholesale.
    pub fn replace(&self, snapshot: StatusSnapshot) {
        *self.inner.write() = Some(snapshot);
    }

    /// Clone out the latest snapshot, if any poll has succeeded yet.
    pub fn latest(&self) -> Option<StatusSnapshot> {
        self.inner.read().clone()
    }
}

impl std::fmt::Debug for SharedStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedStatus")
            .field("populated", &self.inner.read().is_some())
            .finish()
    }
}
