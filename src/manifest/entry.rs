//! Manifest line codec: `<digest>  <path>`

use crate::hash::Digest;

/// Separator between digest and path, as written by `b3sum`.
pub const SEPARATOR: &str = "  ";

/// One manifest line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub digest: Digest,
    pub path: String,
}

impl ManifestEntry {
    pub fn new(digest: Digest, path: impl Into<String>) -> Self {
        Self {
            digest,
            path: path.into(),
        }
    }

    /// Parse a line (without its newline). Splits on the first two-space
    /// separator; the path keeps any further spaces verbatim.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let (digest, path) = line.split_once(SEPARATOR)?;
        if digest.is_empty() || digest.contains(char::is_whitespace) || path.is_empty() {
            return None;
        }
        Some(Self::new(Digest::new(digest), path))
    }

    /// Serialized line including the trailing newline.
    pub fn to_line(&self) -> String {
        format!("{}{}{}\n", self.digest, SEPARATOR, self.path)
    }
}
