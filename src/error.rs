//! Error types for the picohash checksum manifest tool.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while computing a digest through a [`crate::hash::Hasher`]
#[derive(Debug, Error)]
pub enum HashError {
    #[error("Failed to start hash program '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Hash program '{program}' exited with {status} for {path:?}: {stderr}")]
    ExitStatus {
        program: String,
        path: PathBuf,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("Unexpected hash program output for {path:?}: {output:?}")]
    MalformedOutput { path: PathBuf, output: String },

    #[error("Failed to read {path:?} for hashing: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Manifest and filesystem errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid manifest line {line} in {path:?}: {content:?}")]
    Format {
        path: PathBuf,
        line: usize,
        content: String,
    },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// File name that cannot be written as a manifest line (not UTF-8, or
    /// holding a line break). Carries the lossy path for reporting.
    #[error("Unsupported file name: {0}")]
    UnsupportedName(String),

    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
}

impl StorageError {
    /// Attach a path to a raw I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Top-level errors surfaced by the CLI and the library entry points
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Hash error: {0}")]
    Hash(#[from] HashError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
