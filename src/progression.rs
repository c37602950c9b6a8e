//! Progression (XP / level) tracking
//!
//! Derives level, title, and percentage-to-next-level from the latest
//! status snapshot or from XP-carrying stream events. The threshold ladder
//! is compiled in, mirroring the backend's table; the backend remains the
//! authority on the values it reports, the ladder is only used for the
//! bar-fill math.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::event_log::EventRecord;
use crate::status::StatusSnapshot;

/// XP floors and titles, ascending. Index 0 is level 1's floor.
pub const LEVELS: &[(u64, &str)] = &[
    (0, "APPRENTICE"),
    (100, "ACOLYTE"),
    (300, "CONJURER"),
    (700, "WARLOCK"),
    (1500, "NECROMANCER"),
    (3000, "LICH"),
    (6000, "DREADLORD"),
    (12000, "ARCHLICH"),
    (25000, "PWRLVL9000"),
];

/// XP floor for a given level, 0 when the level is off the table.
pub fn level_floor(level: u32) -> u64 {
    level
        .checked_sub(1)
        .and_then(|i| LEVELS.get(i as usize))
        .map(|(floor, _)| *floor)
        .unwrap_or(0)
}

/// Percentage of the way from the current level's floor to the next one.
///
/// Absent `xp_next` means max level: 100 by definition. Degenerate inputs
/// (xp below the floor, `xp_next` at or under the floor) clamp into 0..=100.
pub fn percent_to_next(xp: u64, level: u32, xp_next: Option<u64>) -> f64 {
    let Some(next) = xp_next else {
        return 100.0;
    };
    let floor = level_floor(level);
    if next <= floor {
        return 100.0;
    }
    let gained = xp as f64 - floor as f64;
    let span = (next - floor) as f64;
    (gained / span * 100.0).clamp(0.0, 100.0)
}

/// Numeric XP readout next to the bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XpReadout {
    /// "current / next XP"
    Progress { xp: u64, next: u64 },
    /// Max level reached; no next threshold exists.
    Max { xp: u64 },
}

impl std::fmt::Display for XpReadout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Progress { xp, next } => write!(f, "{xp} / {next} XP"),
            Self::Max { xp } => write!(f, "{xp} XP  ★ MAX ★"),
        }
    }
}

/// Three-way visual activity state for the UI shell sprite.
///
/// Attacking takes precedence over any scanning flag; scanning over idle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Activity {
    #[default]
    Idle,
    Casting,
    Attacking,
}

impl Activity {
    /// Derive from a snapshot's running-operation flags.
    pub fn derive(status: &StatusSnapshot) -> Self {
        if status.wifi_attacking {
            Self::Attacking
        } else if status.wifi_scanning || status.web_scanning || status.net_scanning {
            Self::Casting
        } else {
            Self::Idle
        }
    }
}

/// Derived progression state. Recomputed, never independently owned.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressionState {
    pub xp: u64,
    pub level: u32,
    pub title: String,
    pub xp_next: Option<u64>,
    pub activity: Activity,
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self {
            xp: 0,
            level: 1,
            title: "APPRENTICE".to_string(),
            xp_next: Some(LEVELS[1].0),
            activity: Activity::Idle,
        }
    }
}

impl ProgressionState {
    pub fn percent(&self) -> f64 {
        percent_to_next(self.xp, self.level, self.xp_next)
    }

    pub fn readout(&self) -> XpReadout {
        match self.xp_next {
            Some(next) => XpReadout::Progress { xp: self.xp, next },
            None => XpReadout::Max { xp: self.xp },
        }
    }
}

/// Cloneable handle over the shared progression state.
///
/// Fed by the status poller (full recompute) and the event stream
/// (immediate level-up notice ahead of the next poll tick).
#[derive(Clone, Default)]
pub struct ProgressionTracker {
    state: Arc<RwLock<ProgressionState>>,
    level_up: Arc<RwLock<Option<u32>>>,
}

impl ProgressionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute the whole state from a fresh snapshot.
    pub fn observe_snapshot(&self, status: &StatusSnapshot) {
        let mut state = self.state.write();
        state.xp = status.xp;
        state.level = status.level;
        state.title = status.title.clone();
        state.xp_next = status.xp_next;
        state.activity = Activity::derive(status);
    }

    /// Apply a level-up event immediately rather than waiting for the next
    /// poll; non-level-up events are ignored.
    pub fn observe_event(&self, record: &EventRecord) {
        if !record.is_level_up() {
            return;
        }
        let mut state = self.state.write();
        if let Some(level) = record.new_level() {
            state.level = level;
            *self.level_up.write() = Some(level);
        }
        if let Some(title) = record.new_title() {
            state.title = title.to_string();
        }
        tracing::info!(level = state.level, title = %state.title, "level up");
    }

    /// One-shot level-up marker for the UI shell's flash effect.
    pub fn take_level_up(&self) -> Option<u32> {
        self.level_up.write().take()
    }

    pub fn state(&self) -> ProgressionState {
        self.state.read().clone()
    }

    pub fn percent(&self) -> f64 {
        self.state.read().percent()
    }

    pub fn readout(&self) -> XpReadout {
        self.state.read().readout()
    }

    pub fn activity(&self) -> Activity {
        self.state.read().activity
    }
}

impl std::fmt::Debug for ProgressionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressionTracker")
            .field("state", &*self.state.read())
            .finish()
    }
}
