//! Digest computation
//!
//! Every digest goes through the [`Hasher`] trait. The default implementations
//! run an external BLAKE3 utility (`b3sum`), either directly on the file path or
//! fed through a reader process; [`Blake3Hasher`] computes the same digest in
//! process.

pub mod builtin;
pub mod external;

pub use builtin::Blake3Hasher;
pub use external::{DirectHasher, PipedHasher};

use crate::config::{HashStrategy, HashingConfig};
use crate::error::HashError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::warn;

/// Content digest as printed by the hash utility (lowercase hex for BLAKE3).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digest(String);

impl Digest {
    pub fn new(value: impl Into<String>) -> Self {
        Digest(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare two digests, ignoring hex case.
    pub fn matches(&self, other: &Digest) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Computes the digest of a single file.
pub trait Hasher {
    /// Short name used in logs ("direct", "piped", "builtin").
    fn name(&self) -> &'static str;

    fn compute(&self, path: &Path) -> Result<Digest, HashError>;
}

/// Build the hasher selected by configuration.
pub fn hasher_from_config(config: &HashingConfig) -> Box<dyn Hasher> {
    match config.strategy {
        HashStrategy::Builtin => Box::new(Blake3Hasher::new()),
        HashStrategy::Piped if cfg!(windows) => {
            warn!("Piped hashing is not available on Windows, using direct invocation");
            Box::new(DirectHasher::from_config(config))
        }
        HashStrategy::Piped => Box::new(PipedHasher::from_config(config)),
        HashStrategy::Direct => Box::new(DirectHasher::from_config(config)),
    }
}

/// Extract the digest from hash utility output of the form `<hex-digest> <label>`.
///
/// The label is optional (`b3sum --no-names` omits it). The digest must be
/// non-empty, even-length hex.
pub fn parse_hasher_output(path: &Path, stdout: &[u8]) -> Result<Digest, HashError> {
    let text = String::from_utf8_lossy(stdout);
    let malformed = || HashError::MalformedOutput {
        path: path.to_path_buf(),
        output: text.trim().to_string(),
    };

    let first_line = text.lines().next().ok_or_else(malformed)?;
    let token = first_line.split_whitespace().next().ok_or_else(malformed)?;
    if hex::decode(token).is_err() {
        return Err(malformed());
    }

    Ok(Digest::new(token))
}
