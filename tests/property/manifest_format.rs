//! Manifest line and aggregate rendering properties

use picohash::hash::Digest;
use picohash::manifest::{AggregateManifest, ManifestEntry};
use proptest::prelude::*;
use std::path::PathBuf;

/// Path segments without separators, leading dots or whitespace edges.
fn segment() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_][a-zA-Z0-9_ .-]{0,11}".prop_map(|s| s.trim_end().to_string())
}

fn relative_key() -> impl Strategy<Value = String> {
    prop::collection::vec(segment(), 1..4).prop_map(|segments| segments.join("/"))
}

fn digest() -> impl Strategy<Value = String> {
    "[0-9a-f]{64}"
}

/// A line built from a digest and a path parses back to the same pair
#[test]
fn test_entry_line_parses_back() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(digest(), relative_key()), |(digest, key)| {
            let entry = ManifestEntry::new(Digest::new(digest.clone()), key.clone());
            let line = entry.to_line();
            prop_assert!(line.ends_with('\n'));

            let parsed = ManifestEntry::parse(line.trim_end_matches('\n')).unwrap();
            prop_assert_eq!(parsed.digest.as_str(), digest.as_str());
            prop_assert_eq!(parsed.path, key);
            Ok(())
        })
        .unwrap();
}

/// Rendering does not depend on insertion order
#[test]
fn test_render_is_insertion_order_independent() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &prop::collection::btree_map(relative_key(), digest(), 0..16),
            |entries| {
                let mut forward = AggregateManifest::new(PathBuf::from("hashes.b3"));
                for (key, digest) in &entries {
                    forward.insert(key.clone(), Digest::new(digest.clone()));
                }
                let mut backward = AggregateManifest::new(PathBuf::from("hashes.b3"));
                for (key, digest) in entries.iter().rev() {
                    backward.insert(key.clone(), Digest::new(digest.clone()));
                }

                let rendered = forward.render();
                prop_assert_eq!(&rendered, &backward.render());

                let keys: Vec<&str> = rendered
                    .lines()
                    .map(|line| line.split_once("  ").unwrap().1)
                    .collect();
                let mut sorted = keys.clone();
                sorted.sort();
                prop_assert_eq!(keys, sorted);
                Ok(())
            },
        )
        .unwrap();
}

/// A rendered manifest parses back to the same entries
#[test]
fn test_rendered_manifest_parses_back() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &prop::collection::btree_map(relative_key(), digest(), 0..16),
            |entries| {
                let mut manifest = AggregateManifest::new(PathBuf::from("hashes.b3"));
                for (key, digest) in &entries {
                    manifest.insert(key.clone(), Digest::new(digest.clone()));
                }

                let parsed =
                    AggregateManifest::parse(PathBuf::from("hashes.b3"), &manifest.render())
                        .unwrap();
                prop_assert_eq!(parsed.len(), entries.len());
                for (key, digest) in &entries {
                    prop_assert_eq!(parsed.get(key).map(Digest::as_str), Some(digest.as_str()));
                }
                Ok(())
            },
        )
        .unwrap();
}

/// Lines without the two-space separator never parse
#[test]
fn test_single_space_lines_are_rejected() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(digest(), "[a-z0-9]{1,12}"), |(digest, name)| {
            let line = format!("{} {}", digest, name);
            prop_assert!(ManifestEntry::parse(&line).is_none());
            Ok(())
        })
        .unwrap();
}
