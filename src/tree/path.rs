//! Root-relative manifest keys and sidecar path helpers
//!
//! Manifest keys are root-relative, `/`-separated, and never contain `.` or
//! `..` components, so a manifest can only ever name files inside its root.

use crate::error::StorageError;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Manifest key for `path` relative to `root`.
///
/// Names that cannot round-trip through a manifest line yield
/// [`StorageError::UnsupportedName`].
pub fn relative_key(root: &Path, path: &Path) -> Result<String, StorageError> {
    let relative = path.strip_prefix(root).map_err(|_| {
        StorageError::InvalidPath(format!(
            "{} is not inside {}",
            path.display(),
            root.display()
        ))
    })?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(name) => match name.to_str() {
                Some(name) if !name.contains(['\n', '\r']) => parts.push(name),
                _ => {
                    return Err(StorageError::UnsupportedName(
                        relative.to_string_lossy().replace('\\', "/"),
                    ))
                }
            },
            Component::CurDir => {}
            _ => {
                return Err(StorageError::InvalidPath(format!(
                    "unexpected component in {}",
                    relative.display()
                )))
            }
        }
    }

    if parts.is_empty() {
        return Err(StorageError::InvalidPath(format!(
            "{} has no path below {}",
            path.display(),
            root.display()
        )));
    }
    Ok(parts.join("/"))
}

/// Whether a manifest key stays inside the root: relative, non-empty, and
/// free of `.`/`..` segments. A backslash is an ordinary name character
/// except on Windows, where it is a separator.
pub fn is_safe_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('/')
        && !(cfg!(windows) && key.contains('\\'))
        && key
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}

/// Filesystem path for a manifest key.
pub fn resolve_key(root: &Path, key: &str) -> PathBuf {
    key.split('/').fold(root.to_path_buf(), |acc, segment| acc.join(segment))
}

/// `path` with `.{extension}` appended to its file name.
pub fn sidecar_path(path: &Path, extension: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// The original file a sidecar belongs to, if `path` ends in `.{extension}`.
pub fn original_path(path: &Path, extension: &str) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    let stem = name.strip_suffix(extension)?.strip_suffix('.')?;
    if stem.is_empty() {
        return None;
    }
    Some(path.with_file_name(stem))
}

/// File name of `path` as UTF-8.
pub fn file_name(path: &Path) -> Result<String, StorageError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            StorageError::InvalidPath(format!("{} has no UTF-8 file name", path.display()))
        })
}

/// Existence check where "not found" is an answer, not an error.
pub fn exists(path: &Path) -> Result<bool, StorageError> {
    match std::fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(StorageError::io(path, e)),
    }
}
