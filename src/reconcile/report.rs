//! Run tallies

use crate::reconcile::event::FileEvent;
use serde::Serialize;

/// Counters for one run, updated from the events it emits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub verified: usize,
    pub mismatched: usize,
    pub file_not_found: usize,
    pub hash_not_found: usize,
    pub computed: usize,
    pub skipped: usize,
    pub collected: usize,
    pub written: usize,
    pub removed: usize,
    pub unsupported: usize,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: &FileEvent) {
        match event {
            FileEvent::Computed { .. } => self.computed += 1,
            FileEvent::Skipped { .. } => self.skipped += 1,
            FileEvent::Verified { .. } => self.verified += 1,
            FileEvent::Mismatch { .. } => self.mismatched += 1,
            FileEvent::HashNotFound { .. } => self.hash_not_found += 1,
            FileEvent::FileNotFound { .. } => self.file_not_found += 1,
            FileEvent::Collected { .. } => self.collected += 1,
            FileEvent::Written { .. } => self.written += 1,
            FileEvent::Removed { .. } => self.removed += 1,
            FileEvent::Unsupported { .. } => self.unsupported += 1,
        }
    }

    /// No mismatches, missing digests or orphans.
    pub fn is_clean(&self) -> bool {
        self.mismatched == 0 && self.file_not_found == 0 && self.hash_not_found == 0
    }
}
