//! Tab lifecycle: view registry and single-active-view router
//!
//! Exactly one view is active at a time. Switching always runs the outgoing
//! view's deactivate hook strictly before the incoming view's activate hook,
//! and a hook failure never aborts the switch — the router has no rollback
//! state to return to, so it logs and keeps going.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::ConsoleError;
use crate::status::StatusSnapshot;

/// Lifecycle hooks a view may implement.
///
/// All hooks default to no-ops, so a view implements only the capabilities
/// it has. Hooks are invoked synchronously while the router lock is held;
/// long-running refresh work belongs in a
/// [`RepeatingTask`](crate::schedule::RepeatingTask) started from
/// `on_activate` and cancelled from `on_deactivate`.
pub trait View: Send {
    /// Called after this view becomes active.
    fn on_activate(&mut self) -> Result<(), ConsoleError> {
        Ok(())
    }

    /// Called before another view becomes active.
    fn on_deactivate(&mut self) -> Result<(), ConsoleError> {
        Ok(())
    }

    /// Called with each status snapshot while this view is active.
    fn on_status(&mut self, _status: &StatusSnapshot) -> Result<(), ConsoleError> {
        Ok(())
    }
}

/// Name → view mapping. Entries live for the process lifetime; the last
/// registration for a name wins.
#[derive(Default)]
pub struct TabRegistry {
    views: HashMap<String, Box<dyn View>>,
}

impl TabRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store or overwrite the view for `name`. Overwriting the currently
    /// active view's entry does not itself run any hook.
    pub fn register(&mut self, name: impl Into<String>, view: Box<dyn View>) {
        self.views.insert(name.into(), view);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.views.contains_key(name)
    }

    /// The view registered for `name`, if any.
    pub fn lookup(&self, name: &str) -> Option<&dyn View> {
        self.views.get(name).map(|view| view.as_ref())
    }

    fn lookup_mut(&mut self, name: &str) -> Option<&mut Box<dyn View>> {
        self.views.get_mut(name)
    }
}

impl std::fmt::Debug for TabRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TabRegistry")
            .field("views", &self.views.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Single-active-view state machine.
#[derive(Debug, Default)]
pub struct TabRouter {
    registry: TabRegistry,
    active: Option<String>,
}

impl TabRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a view. Forwarded to the registry; see
    /// [`TabRegistry::register`].
    pub fn register(&mut self, name: impl Into<String>, view: Box<dyn View>) {
        self.registry.register(name, view);
    }

    /// Currently active view name, if any switch has happened yet.
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Switch the active view.
    ///
    /// Deactivates the outgoing view, marks `name` active unconditionally
    /// (unregistered names are legal targets — their hooks are just
    /// skipped), then activates the incoming view. Re-selecting the active
    /// name runs deactivate+activate again; hooks are expected to have
    /// idempotent side effects.
    pub fn switch_to(&mut self, name: impl Into<String>) {
        let name = name.into();
        if let Some(outgoing) = self.active.clone() {
            if let Some(view) = self.registry.lookup_mut(&outgoing) {
                if let Err(error) = view.on_deactivate() {
                    tracing::warn!(view = %outgoing, %error, "deactivate hook failed");
                }
            }
        }
        self.active = Some(name.clone());
        if let Some(view) = self.registry.lookup_mut(&name) {
            if let Err(error) = view.on_activate() {
                tracing::warn!(view = %name, %error, "activate hook failed");
            }
        }
    }

    /// Forward a snapshot to the active view's status hook, if it has one
    /// registered. Delivery targets the view active *now* — a snapshot
    /// fetched before a switch still lands on the then-current view.
    pub fn dispatch_status(&mut self, status: &StatusSnapshot) {
        let Some(active) = self.active.clone() else {
            return;
        };
        if let Some(view) = self.registry.lookup_mut(&active) {
            if let Err(error) = view.on_status(status) {
                tracing::warn!(view = %active, %error, "status hook failed");
            }
        }
    }
}

/// Router handle shared between the poller task and callers.
///
/// The mutex serializes hook invocation, preserving the deactivate-before-
/// activate ordering on a multi-threaded runtime.
pub type SharedRouter = Arc<Mutex<TabRouter>>;

/// Convenience constructor for the shared handle.
pub fn shared_router() -> SharedRouter {
    Arc::new(Mutex::new(TabRouter::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingView {
        activations: Arc<AtomicUsize>,
        deactivations: Arc<AtomicUsize>,
        statuses: Arc<AtomicUsize>,
    }

    impl View for CountingView {
        fn on_activate(&mut self) -> Result<(), ConsoleError> {
            self.activations.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn on_deactivate(&mut self) -> Result<(), ConsoleError> {
            self.deactivations.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn on_status(&mut self, _status: &StatusSnapshot) -> Result<(), ConsoleError> {
            self.statuses.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn switch_marks_unregistered_names_active() {
        let mut router = TabRouter::new();
        assert_eq!(router.active(), None);
        router.switch_to("ghost");
        assert_eq!(router.active(), Some("ghost"));
    }

    #[test]
    fn register_last_wins() {
        let mut registry = TabRegistry::new();
        registry.register("wifi", Box::new(CountingView::default()));
        registry.register("wifi", Box::new(CountingView::default()));
        assert!(registry.contains("wifi"));
        assert!(!registry.contains("loot"));
    }

    #[test]
    fn status_goes_only_to_the_active_view() {
        let hits = Arc::new(AtomicUsize::new(0));
        let other_hits = Arc::new(AtomicUsize::new(0));
        let mut router = TabRouter::new();
        router.register(
            "wifi",
            Box::new(CountingView {
                statuses: hits.clone(),
                ..Default::default()
            }),
        );
        router.register(
            "loot",
            Box::new(CountingView {
                statuses: other_hits.clone(),
                ..Default::default()
            }),
        );

        let status = StatusSnapshot::default();
        router.dispatch_status(&status); // no active view yet
        router.switch_to("wifi");
        router.dispatch_status(&status);
        router.dispatch_status(&status);

        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(other_hits.load(Ordering::SeqCst), 0);
    }
}
