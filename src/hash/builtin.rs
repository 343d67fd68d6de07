//! In-process BLAKE3 hashing

use crate::error::HashError;
use crate::hash::{Digest, Hasher};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Streams the file through `blake3` and yields the same hex digest `b3sum` prints.
#[derive(Debug, Default, Clone, Copy)]
pub struct Blake3Hasher;

impl Blake3Hasher {
    pub fn new() -> Self {
        Blake3Hasher
    }
}

impl Hasher for Blake3Hasher {
    fn name(&self) -> &'static str {
        "builtin"
    }

    fn compute(&self, path: &Path) -> Result<Digest, HashError> {
        let read_error = |source| HashError::Read {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(read_error)?;
        let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
        let mut hasher = blake3::Hasher::new();
        std::io::copy(&mut reader, &mut hasher).map_err(read_error)?;

        Ok(Digest::new(hasher.finalize().to_hex().to_string()))
    }
}
