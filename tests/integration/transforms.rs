//! Join, split and remove

use crate::integration::test_utils::{b3, builtin_reconciler, files_with_suffix, fixture_tree, read};
use picohash::reconcile::{Mode, NullSink, Operation};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Digest recorded in every sidecar under `root`, keyed by sidecar path.
fn sidecar_digests(root: &Path) -> BTreeMap<String, String> {
    files_with_suffix(root, ".b3")
        .into_iter()
        .filter(|relative| !relative.ends_with("hashes.b3"))
        .map(|relative| {
            let text = read(&root.join(&relative));
            let digest = text.split("  ").next().unwrap().to_string();
            (relative, digest)
        })
        .collect()
}

#[test]
fn test_split_of_join_reproduces_sidecars() {
    let tree = fixture_tree(&[
        ("a.txt", "alpha"),
        ("x/same.txt", "one"),
        ("y/same.txt", "two"),
        ("y/z/deep.txt", "deep"),
    ]);
    let root = tree.path();
    let reconciler = builtin_reconciler(root);
    reconciler
        .reconcile(Mode::GenerateSidecars, &mut NullSink)
        .unwrap();
    let original = sidecar_digests(root);
    assert_eq!(original.len(), 4);

    reconciler
        .execute(Operation::JoinSidecars, &mut NullSink)
        .unwrap();
    reconciler
        .execute(Operation::RemoveSidecars, &mut NullSink)
        .unwrap();
    assert!(sidecar_digests(root).is_empty());

    let report = reconciler
        .execute(Operation::SplitAggregate, &mut NullSink)
        .unwrap();

    assert_eq!(report.written, 4);
    assert_eq!(sidecar_digests(root), original);
    assert_eq!(
        read(&root.join("y/same.txt.b3")),
        format!("{}  same.txt\n", b3("two"))
    );
}

#[test]
fn test_join_then_verify_aggregate_is_clean() {
    let tree = fixture_tree(&[("a.txt", "alpha"), ("sub/b.txt", "beta")]);
    let reconciler = builtin_reconciler(tree.path());
    reconciler
        .reconcile(Mode::GenerateSidecars, &mut NullSink)
        .unwrap();

    let joined = reconciler
        .execute(Operation::JoinSidecars, &mut NullSink)
        .unwrap();
    assert_eq!(joined.collected, 2);
    assert_eq!(joined.written, 1);

    let verified = reconciler
        .reconcile(Mode::VerifyAggregate, &mut NullSink)
        .unwrap();
    assert_eq!(verified.verified, 2);
    assert!(verified.is_clean());
}

#[test]
fn test_sidecar_supersedes_existing_aggregate_entry() {
    let tree = fixture_tree(&[("a.txt", "alpha"), ("b.txt", "beta")]);
    fs::write(
        tree.path().join("hashes.b3"),
        format!("{}  a.txt\n0000  b.txt\n", b3("alpha")),
    )
    .unwrap();
    fs::write(
        tree.path().join("b.txt.b3"),
        format!("{}  b.txt\n", b3("beta")),
    )
    .unwrap();

    builtin_reconciler(tree.path())
        .execute(Operation::JoinSidecars, &mut NullSink)
        .unwrap();

    assert_eq!(
        read(&tree.path().join("hashes.b3")),
        format!("{}  a.txt\n{}  b.txt\n", b3("alpha"), b3("beta"))
    );
}

#[test]
fn test_remove_deletes_only_sidecars_and_is_idempotent() {
    let tree = fixture_tree(&[
        ("a.txt", "alpha"),
        ("notes.b3.txt", "not a sidecar"),
        ("sub/b.txt", "beta"),
        ("sub/hashes.b3", ""),
    ]);
    let root = tree.path();
    let reconciler = builtin_reconciler(root);
    reconciler
        .reconcile(Mode::GenerateSidecars, &mut NullSink)
        .unwrap();
    reconciler
        .reconcile(Mode::GenerateAggregate, &mut NullSink)
        .unwrap();

    let first = reconciler
        .execute(Operation::RemoveSidecars, &mut NullSink)
        .unwrap();

    assert_eq!(first.removed, 3);
    assert_eq!(
        files_with_suffix(root, ".b3"),
        vec!["hashes.b3".to_string(), "sub/hashes.b3".to_string()]
    );
    assert_eq!(read(&root.join("a.txt")), "alpha");
    assert_eq!(read(&root.join("notes.b3.txt")), "not a sidecar");

    let second = reconciler
        .execute(Operation::RemoveSidecars, &mut NullSink)
        .unwrap();
    assert_eq!(second.removed, 0);
    assert_eq!(
        files_with_suffix(root, ".b3"),
        vec!["hashes.b3".to_string(), "sub/hashes.b3".to_string()]
    );
}

#[test]
fn test_split_reports_entries_without_files() {
    let tree = fixture_tree(&[("kept.txt", "kept")]);
    fs::write(
        tree.path().join("hashes.b3"),
        format!("{}  kept.txt\n{}  lost.txt\n", b3("kept"), b3("lost")),
    )
    .unwrap();

    let report = builtin_reconciler(tree.path())
        .execute(Operation::SplitAggregate, &mut NullSink)
        .unwrap();

    assert_eq!(report.written, 1);
    assert_eq!(report.file_not_found, 1);
    assert!(tree.path().join("kept.txt.b3").exists());
    assert!(!tree.path().join("lost.txt.b3").exists());
}

#[test]
fn test_repeated_join_with_nested_aggregate_verifies_clean() {
    let tree = fixture_tree(&[
        ("a.txt", "alpha"),
        ("sub/b.txt", "beta"),
        ("sub/hashes.b3", ""),
    ]);
    let root = tree.path();
    let reconciler = builtin_reconciler(root);
    reconciler
        .reconcile(Mode::GenerateSidecars, &mut NullSink)
        .unwrap();
    fs::write(root.join("sub/hashes.b3"), format!("{}  b.txt\n", b3("beta"))).unwrap();

    reconciler
        .execute(Operation::JoinSidecars, &mut NullSink)
        .unwrap();
    let first = read(&root.join("hashes.b3"));
    let again = reconciler
        .execute(Operation::JoinSidecars, &mut NullSink)
        .unwrap();

    assert_eq!(again.collected, 2);
    assert_eq!(read(&root.join("hashes.b3")), first);
    assert_eq!(
        first,
        format!("{}  a.txt\n{}  sub/b.txt\n", b3("alpha"), b3("beta"))
    );

    let verified = reconciler
        .reconcile(Mode::VerifyAggregate, &mut NullSink)
        .unwrap();
    assert_eq!(verified.verified, 2);
    assert_eq!(verified.file_not_found, 0);
    assert!(verified.is_clean());
}
