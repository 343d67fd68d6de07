//! Checksum manifests
//!
//! Two on-disk forms share one line format (`<digest>  <path>\n`):
//! - a sidecar `<file>.b3` next to each file, naming only the file's base name;
//! - an aggregate `hashes.b3` in the root, naming root-relative paths.
//!
//! Both are written through a temp file and a rename.

pub mod aggregate;
pub mod entry;
pub mod sidecar;

pub use aggregate::AggregateManifest;
pub use entry::ManifestEntry;

use crate::config::ManifestConfig;
use crate::error::StorageError;
use crate::tree::path;
use std::fs;
use std::path::{Path, PathBuf};

/// Manifest file naming for one run.
#[derive(Debug, Clone)]
pub struct Layout {
    aggregate_name: String,
    sidecar_extension: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self::from(&ManifestConfig::default())
    }
}

impl From<&ManifestConfig> for Layout {
    fn from(config: &ManifestConfig) -> Self {
        Self {
            aggregate_name: config.aggregate_name.clone(),
            sidecar_extension: config.sidecar_extension.clone(),
        }
    }
}

impl Layout {
    pub fn aggregate_name(&self) -> &str {
        &self.aggregate_name
    }

    pub fn sidecar_extension(&self) -> &str {
        &self.sidecar_extension
    }

    /// Aggregate manifest path for a root.
    pub fn aggregate_path(&self, root: &Path) -> PathBuf {
        root.join(&self.aggregate_name)
    }

    /// Sidecar path for a file.
    pub fn sidecar_for(&self, file: &Path) -> PathBuf {
        path::sidecar_path(file, &self.sidecar_extension)
    }

    /// Any manifest file (sidecar or aggregate): never hashed itself.
    pub fn is_manifest_file(&self, file: &Path) -> bool {
        self.original_of(file).is_some()
    }

    /// An aggregate manifest, at any depth.
    pub fn is_aggregate(&self, file: &Path) -> bool {
        file.file_name()
            .map(|name| name == self.aggregate_name.as_str())
            .unwrap_or(false)
    }

    /// A per-file sidecar: a manifest file that is not an aggregate.
    pub fn is_sidecar(&self, file: &Path) -> bool {
        self.is_manifest_file(file) && !self.is_aggregate(file)
    }

    /// The file a sidecar describes.
    pub fn original_of(&self, sidecar: &Path) -> Option<PathBuf> {
        path::original_path(sidecar, &self.sidecar_extension)
    }
}

/// Write `contents` to `target` via a sibling temp file and a rename, so
/// readers never observe a truncated manifest.
pub fn write_atomic(target: &Path, contents: &str) -> Result<(), StorageError> {
    let name = path::file_name(target)?;
    let temp_path = target.with_file_name(format!(".{}.tmp", name));

    fs::write(&temp_path, contents).map_err(|e| StorageError::io(&temp_path, e))?;

    fs::rename(&temp_path, target).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        StorageError::io(target, e)
    })
}
