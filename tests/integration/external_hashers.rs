//! Reconciliation through external hash programs
//!
//! A small shell script stands in for b3sum: it prints the file size as an
//! eight-digit hex "digest", reading the path argument when given and stdin
//! otherwise. When a real b3sum is installed its output is also checked
//! against the in-process hasher.

use crate::integration::test_utils::{fixture_tree, read};
use picohash::config::{HashStrategy, PicohashConfig};
use picohash::hash::{Blake3Hasher, DirectHasher, Hasher, PipedHasher};
use picohash::reconcile::{Mode, NullSink, Reconciler};
use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

const SIZE_HASHER: &str = r#"
for last; do :; done
if [ -n "$last" ] && [ -f "$last" ]; then
    n=$(wc -c < "$last")
else
    n=$(wc -c)
fi
printf '%08x  %s\n' "$((n))" "${last:--}"
"#;

fn size_hasher_config(script_dir: &Path, strategy: HashStrategy) -> PicohashConfig {
    let script = script_dir.join("size-hasher.sh");
    fs::write(&script, SIZE_HASHER).unwrap();

    let mut config = PicohashConfig::default();
    config.hashing.program = "sh".to_string();
    config.hashing.args = vec![script.to_string_lossy().into_owned()];
    config.hashing.strategy = strategy;
    config
}

#[cfg(unix)]
#[test]
fn test_direct_generate_then_piped_verify() {
    let scripts = tempfile::TempDir::new().unwrap();
    let tree = fixture_tree(&[("a.txt", "alpha"), ("sub/b.txt", "bb")]);

    let direct = Reconciler::from_config(
        tree.path().to_path_buf(),
        &size_hasher_config(scripts.path(), HashStrategy::Direct),
    );
    let generated = direct
        .reconcile(Mode::GenerateSidecars, &mut NullSink)
        .unwrap();
    assert_eq!(generated.computed, 2);
    assert_eq!(read(&tree.path().join("a.txt.b3")), "00000005  a.txt\n");

    let piped = Reconciler::from_config(
        tree.path().to_path_buf(),
        &size_hasher_config(scripts.path(), HashStrategy::Piped),
    );
    let verified = piped
        .reconcile(Mode::VerifySidecars, &mut NullSink)
        .unwrap();
    assert_eq!(verified.verified, 2);

    fs::write(tree.path().join("sub/b.txt"), "bbb").unwrap();
    let after_edit = piped
        .reconcile(Mode::VerifySidecars, &mut NullSink)
        .unwrap();
    assert_eq!(after_edit.mismatched, 1);
}

#[cfg(unix)]
#[test]
fn test_failing_hash_program_aborts_run() {
    let scripts = tempfile::TempDir::new().unwrap();
    let tree = fixture_tree(&[("a.txt", "alpha"), ("b.txt", "beta")]);
    let script = scripts.path().join("fail.sh");
    fs::write(&script, "echo broken >&2\nexit 3\n").unwrap();

    let mut config = PicohashConfig::default();
    config.hashing.program = "sh".to_string();
    config.hashing.args = vec![script.to_string_lossy().into_owned()];

    let mut events = Vec::new();
    let result = Reconciler::from_config(tree.path().to_path_buf(), &config)
        .reconcile(Mode::GenerateSidecars, &mut events);

    assert!(matches!(result, Err(picohash::error::ApiError::Hash(_))));
    assert!(events.is_empty());
    assert!(!tree.path().join("a.txt.b3").exists());
}

fn b3sum_available() -> bool {
    Command::new("b3sum")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[test]
fn test_b3sum_matches_builtin_when_installed() {
    if !b3sum_available() {
        return;
    }
    let tree = fixture_tree(&[("data.bin", "some archived bytes")]);
    let file = tree.path().join("data.bin");

    let expected = Blake3Hasher::new().compute(&file).unwrap();
    let direct = DirectHasher::new("b3sum").compute(&file).unwrap();
    let slow = DirectHasher::new("b3sum")
        .with_slow_media(true)
        .compute(&file)
        .unwrap();

    assert_eq!(direct, expected);
    assert_eq!(slow, expected);

    #[cfg(unix)]
    {
        let piped = PipedHasher::new("cat", "b3sum").compute(&file).unwrap();
        assert_eq!(piped, expected);
    }
}
