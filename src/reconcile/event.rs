//! Per-file outcomes emitted while a run progresses

use crate::hash::Digest;
use serde::Serialize;

/// What happened to one file (paths are root-relative keys).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FileEvent {
    /// Digest computed and recorded.
    Computed { path: String },
    /// Digest already recorded; nothing computed.
    Skipped { path: String },
    /// Computed digest matches the recorded one.
    Verified { path: String },
    /// Computed digest differs from the recorded one.
    Mismatch {
        path: String,
        expected: Digest,
        actual: Digest,
    },
    /// File exists but no digest is recorded for it.
    HashNotFound { path: String },
    /// A digest is recorded for a file that no longer exists.
    FileNotFound { path: String },
    /// Sidecar read into the aggregate manifest.
    Collected { path: String },
    /// Manifest or sidecar file written.
    Written { path: String },
    /// Sidecar deleted.
    Removed { path: String },
    /// File left out because its name cannot be written to a manifest.
    Unsupported { path: String },
}

impl FileEvent {
    pub fn path(&self) -> &str {
        match self {
            FileEvent::Computed { path }
            | FileEvent::Skipped { path }
            | FileEvent::Verified { path }
            | FileEvent::Mismatch { path, .. }
            | FileEvent::HashNotFound { path }
            | FileEvent::FileNotFound { path }
            | FileEvent::Collected { path }
            | FileEvent::Written { path }
            | FileEvent::Removed { path }
            | FileEvent::Unsupported { path } => path,
        }
    }
}

/// Receives events as they happen.
pub trait EventSink {
    fn record(&mut self, event: &FileEvent);
}

impl EventSink for Vec<FileEvent> {
    fn record(&mut self, event: &FileEvent) {
        self.push(event.clone());
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&mut self, _event: &FileEvent) {}
}
