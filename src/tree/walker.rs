//! Filesystem walker for traversing directory structures

use crate::config::WalkConfig;
use crate::error::StorageError;
use std::path::PathBuf;
use walkdir::{DirEntry, WalkDir};

/// Filesystem walker configuration
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Whether to follow symbolic links (default: false)
    pub follow_symlinks: bool,
    /// Path component names to skip entirely (e.g. ".git")
    pub ignore_patterns: Vec<String>,
}

impl From<&WalkConfig> for WalkerConfig {
    fn from(config: &WalkConfig) -> Self {
        Self {
            follow_symlinks: config.follow_symlinks,
            ignore_patterns: config.ignore.clone(),
        }
    }
}

/// Depth-first walker yielding every regular file under a root once.
///
/// Directory entries are sorted by file name, so the visiting order is stable
/// across runs and files created in an already-listed directory during the
/// walk are not visited.
pub struct Walker {
    root: PathBuf,
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given root path
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            config: WalkerConfig::default(),
        }
    }

    /// Create a walker with custom configuration
    pub fn with_config(root: PathBuf, config: WalkerConfig) -> Self {
        Self { root, config }
    }

    /// Iterate over regular files. The first traversal error is yielded as an
    /// `Err` item; callers stop there.
    pub fn files(&self) -> impl Iterator<Item = Result<PathBuf, StorageError>> + '_ {
        WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| entry.depth() == 0 || !self.should_ignore(entry))
            .filter_map(|entry| match entry {
                Ok(entry) if entry.file_type().is_file() => Some(Ok(entry.into_path())),
                Ok(_) => None,
                Err(e) => Some(Err(StorageError::Walk(e))),
            })
    }

    /// Collect all regular files, stopping at the first error.
    pub fn walk(&self) -> Result<Vec<PathBuf>, StorageError> {
        self.files().collect()
    }

    /// Check if an entry's name matches an ignore pattern
    fn should_ignore(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        self.config
            .ignore_patterns
            .iter()
            .any(|pattern| name == pattern.as_str())
    }
}
