//! Error types for the console core

use thiserror::Error;

/// Errors surfaced by the console core.
///
/// Transport failures are deliberately *not* here: the API layer collapses
/// them into a `None` sentinel so callers treat "no result" and "server
/// returned an error body" uniformly. Hook failures are isolated by the
/// router (logged, never propagated), so these variants mostly show up in
/// logs and in view code.
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("view error: {0}")]
    View(String),

    #[error("stream error: {0}")]
    Stream(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConsoleError {
    /// Shorthand for view-hook failures.
    pub fn view(msg: impl Into<String>) -> Self {
        Self::View(msg.into())
    }
}
