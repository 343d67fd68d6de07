//! End-to-end runs of the picohash binary

use crate::integration::test_utils::{b3, fixture_tree, read};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

/// Run the binary against `root` with the in-process hasher and an empty
/// config file so no host configuration leaks in.
fn picohash(root: &Path, args: &[&str]) -> Output {
    let config = root.join(".picohash.toml");
    if !config.exists() {
        fs::write(&config, "").unwrap();
    }
    Command::new(env!("CARGO_BIN_EXE_picohash"))
        .arg("--builtin")
        .arg("--quiet")
        .arg("--no-color")
        .arg("--config")
        .arg(&config)
        .args(args)
        .arg(root)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_generate_then_check_exits_clean() {
    let tree = fixture_tree(&[("a.txt", "alpha"), ("sub/b.txt", "beta")]);

    let generate = picohash(tree.path(), &[]);
    assert_eq!(generate.status.code(), Some(0));
    assert!(stdout(&generate).contains("computed  a.txt"));
    assert_eq!(
        read(&tree.path().join("a.txt.b3")),
        format!("{}  a.txt\n", b3("alpha"))
    );

    let check = picohash(tree.path(), &["-c"]);
    assert_eq!(check.status.code(), Some(0));
    assert!(stdout(&check).contains("ok        sub/b.txt"));
}

#[test]
fn test_check_with_findings_exits_one() {
    let tree = fixture_tree(&[("a.txt", "alpha")]);
    assert_eq!(picohash(tree.path(), &["-a"]).status.code(), Some(0));
    fs::write(tree.path().join("a.txt"), "tampered").unwrap();

    let check = picohash(tree.path(), &["-c", "-a"]);

    assert_eq!(check.status.code(), Some(1));
    assert!(stdout(&check).contains("MISMATCH  a.txt"));
}

#[test]
fn test_malformed_manifest_exits_two() {
    let tree = fixture_tree(&[("a.txt", "alpha"), ("hashes.b3", "garbage\n")]);

    let check = picohash(tree.path(), &["--check", "--aggregate"]);

    assert_eq!(check.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&check.stderr).contains("hashes.b3"));
}

#[test]
fn test_conflicting_flags_are_rejected() {
    let tree = fixture_tree(&[("a.txt", "alpha")]);
    let output = picohash(tree.path(), &["--join", "--remove"]);
    assert!(!output.status.success());
    assert!(!tree.path().join("hashes.b3").exists());
}

#[test]
fn test_json_report() {
    let tree = fixture_tree(&[("a.txt", "alpha")]);

    let output = picohash(tree.path(), &["--format", "json", "-a"]);

    assert_eq!(output.status.code(), Some(0));
    let text = stdout(&output);
    let report_start = text.find("{\n").unwrap();
    let report: serde_json::Value = serde_json::from_str(&text[report_start..]).unwrap();
    assert_eq!(report["operation"], "generate.aggregate");
    assert_eq!(report["report"]["written"], 1);
    assert!(text
        .lines()
        .any(|line| line.contains("\"event\":\"computed\"") && line.contains("a.txt")));
}

#[test]
fn test_version_flag() {
    let output = Command::new(env!("CARGO_BIN_EXE_picohash"))
        .arg("-v")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("picohash "));
}

#[test]
fn test_missing_directory_exits_two() {
    let tree = fixture_tree(&[]);
    let output = Command::new(env!("CARGO_BIN_EXE_picohash"))
        .arg("--quiet")
        .arg(tree.path().join("does-not-exist"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}
