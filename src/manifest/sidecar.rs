//! Per-file sidecars: `<file>.b3` holding `<digest>  <basename>`

use crate::error::StorageError;
use crate::hash::Digest;
use crate::manifest::{write_atomic, Layout, ManifestEntry};
use crate::tree::path;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Read the entry stored in a sidecar. Only the first non-empty line counts.
pub fn read_sidecar(sidecar: &Path) -> Result<ManifestEntry, StorageError> {
    let content = fs::read_to_string(sidecar).map_err(|e| StorageError::io(sidecar, e))?;

    let (index, line) = content
        .lines()
        .enumerate()
        .find(|(_, line)| !line.trim().is_empty())
        .ok_or_else(|| StorageError::Format {
            path: sidecar.to_path_buf(),
            line: 1,
            content: String::new(),
        })?;

    ManifestEntry::parse(line).ok_or_else(|| StorageError::Format {
        path: sidecar.to_path_buf(),
        line: index + 1,
        content: line.to_string(),
    })
}

/// Read the digest a sidecar records for `file`.
///
/// The sidecar's location is authoritative; a name field that disagrees with
/// the file's base name is logged and otherwise ignored.
pub fn read_expected_digest(file: &Path, layout: &Layout) -> Result<Digest, StorageError> {
    let sidecar = layout.sidecar_for(file);
    let entry = read_sidecar(&sidecar)?;
    if let Ok(name) = path::file_name(file) {
        if entry.path != name {
            warn!(
                sidecar = %sidecar.display(),
                recorded = %entry.path,
                expected = %name,
                "Sidecar names a different file; using its location"
            );
        }
    }
    Ok(entry.digest)
}

/// Write `<digest>  <basename>` to the sidecar of `file`, replacing any
/// existing one. Returns the sidecar path.
pub fn write_sidecar(file: &Path, digest: &Digest, layout: &Layout) -> Result<PathBuf, StorageError> {
    let entry = ManifestEntry::new(digest.clone(), path::file_name(file)?);
    let sidecar = layout.sidecar_for(file);
    write_atomic(&sidecar, &entry.to_line())?;
    Ok(sidecar)
}
