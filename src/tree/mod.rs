//! Directory traversal
//!
//! Walks the target directory depth-first and maps files to the root-relative
//! keys used in manifests.

pub mod path;
pub mod walker;
