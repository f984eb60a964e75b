//! Deduplicated warning reporting.
//!
//! Optional sources that fail (unreadable history file, missing git, failed
//! display detection) warn and continue. The sink deduplicates by id so a
//! condition hit in a loop is reported once per run.

use std::collections::HashSet;
use tracing::warn;

/// Collects warning ids so each condition is reported at most once.
///
/// Passed explicitly through call sites; there is no process-wide state.
#[derive(Debug, Default)]
pub struct WarningSink {
    seen: HashSet<&'static str>,
}

impl WarningSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a warning unless one with the same id was already emitted.
    /// Returns true if the warning was actually emitted.
    pub fn warn_once(&mut self, id: &'static str, message: &str) -> bool {
        if self.seen.insert(id) {
            warn!(target: "shellcloud", "{message}");
            true
        } else {
            false
        }
    }

    /// Number of distinct warning conditions seen so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.seen.len()
    }
}
