//! Aggregate manifest: one `<digest>  <relative-path>` line per file

use crate::error::StorageError;
use crate::hash::Digest;
use crate::manifest::{write_atomic, Layout, ManifestEntry};
use crate::tree::path;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// In-memory aggregate manifest keyed by root-relative path.
///
/// Entries are kept sorted, so saving is deterministic.
#[derive(Debug, Clone)]
pub struct AggregateManifest {
    path: PathBuf,
    entries: BTreeMap<String, Digest>,
}

impl AggregateManifest {
    /// Empty manifest that will be saved to `path`.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            entries: BTreeMap::new(),
        }
    }

    /// Load the aggregate manifest of `root`. A missing file yields an empty manifest.
    pub fn load(root: &Path, layout: &Layout) -> Result<Self, StorageError> {
        let path = layout.aggregate_path(root);
        match fs::read_to_string(&path) {
            Ok(content) => Self::parse(path, &content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(manifest = %path.display(), "No aggregate manifest yet");
                Ok(Self::new(path))
            }
            Err(e) => Err(StorageError::io(&path, e)),
        }
    }

    /// Whether the manifest file exists on disk for `root`.
    pub fn exists(root: &Path, layout: &Layout) -> Result<bool, StorageError> {
        path::exists(&layout.aggregate_path(root))
    }

    /// Parse manifest text. Blank lines are skipped; any other malformed line
    /// or unsafe path is a format error.
    pub fn parse(path: PathBuf, content: &str) -> Result<Self, StorageError> {
        let mut entries = BTreeMap::new();
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let format_error = || StorageError::Format {
                path: path.clone(),
                line: index + 1,
                content: line.to_string(),
            };
            let entry = ManifestEntry::parse(line).ok_or_else(format_error)?;
            if !path::is_safe_key(&entry.path) {
                return Err(format_error());
            }
            if let Some(previous) = entries.insert(entry.path.clone(), entry.digest) {
                warn!(
                    manifest = %path.display(),
                    entry = %entry.path,
                    replaced = %previous,
                    "Duplicate manifest entry; the later line wins"
                );
            }
        }
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&Digest> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or replace an entry, returning the previous digest.
    pub fn insert(&mut self, key: impl Into<String>, digest: Digest) -> Option<Digest> {
        self.entries.insert(key.into(), digest)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Digest)> {
        self.entries.iter().map(|(key, digest)| (key.as_str(), digest))
    }

    /// Serialized manifest text, sorted by path.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|(key, digest)| ManifestEntry::new(digest.clone(), key.as_str()).to_line())
            .collect()
    }

    /// Write the whole manifest atomically.
    pub fn save(&self) -> Result<(), StorageError> {
        write_atomic(&self.path, &self.render())?;
        debug!(manifest = %self.path.display(), entries = self.entries.len(), "Saved aggregate manifest");
        Ok(())
    }
}
