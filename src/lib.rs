//! picohash: BLAKE3 checksum manifests for directory trees
//!
//! Walks a directory, hashes every regular file and keeps the digests either
//! in per-file sidecars (`<file>.b3`) or in one aggregate manifest
//! (`hashes.b3`). Later runs verify files against those digests; utility
//! operations convert between the two forms or remove the sidecars.

pub mod cli;
pub mod config;
pub mod error;
pub mod hash;
pub mod logging;
pub mod manifest;
pub mod reconcile;
pub mod tree;
