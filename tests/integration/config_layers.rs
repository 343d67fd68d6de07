//! Configuration layering: global file, target directory file, explicit file

use crate::integration::test_utils::{fixture_tree, with_xdg_env};
use picohash::config::{global_config_path, ConfigLoader, HashStrategy, WORKSPACE_CONFIG_FILE};
use picohash::reconcile::{Mode, NullSink, Reconciler};
use std::fs;
use tempfile::TempDir;

fn write_global(contents: &str) {
    let path = global_config_path().unwrap();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[cfg(target_os = "linux")]
#[test]
fn test_target_directory_file_overrides_global_file() {
    let xdg = TempDir::new().unwrap();
    let tree = fixture_tree(&[]);
    fs::write(
        tree.path().join(WORKSPACE_CONFIG_FILE),
        "[hashing]\nstrategy = \"builtin\"\n",
    )
    .unwrap();

    let config = with_xdg_env(&xdg, || {
        write_global("[hashing]\nstrategy = \"piped\"\nslow_media = true\n");
        ConfigLoader::load(tree.path()).unwrap()
    });

    assert_eq!(config.hashing.strategy, HashStrategy::Builtin);
    assert!(config.hashing.slow_media);
}

#[cfg(target_os = "linux")]
#[test]
fn test_explicit_file_replaces_both_files() {
    let xdg = TempDir::new().unwrap();
    let tree = fixture_tree(&[]);
    fs::write(
        tree.path().join(WORKSPACE_CONFIG_FILE),
        "[hashing]\nprogram = \"from-root\"\n",
    )
    .unwrap();
    let explicit = xdg.path().join("explicit.toml");
    fs::write(&explicit, "[walk]\nignore = [\".git\"]\n").unwrap();

    let config = with_xdg_env(&xdg, || {
        write_global("[hashing]\nslow_media = true\n");
        ConfigLoader::resolve(tree.path(), Some(&explicit)).unwrap()
    });

    assert_eq!(config.hashing.program, "b3sum");
    assert!(!config.hashing.slow_media);
    assert_eq!(config.walk.ignore, vec![".git"]);
}

#[test]
fn test_custom_manifest_names_and_ignores() {
    let tree = fixture_tree(&[
        ("a.txt", "alpha"),
        (".git/HEAD", "ref"),
        ("sub/b.txt", "beta"),
    ]);
    let explicit = tree.path().join("picohash.toml");
    fs::write(
        &explicit,
        "[manifest]\naggregate_name = \"SUMS.blake3\"\nsidecar_extension = \"blake3\"\n\n[walk]\nignore = [\".git\"]\n\n[hashing]\nstrategy = \"builtin\"\n",
    )
    .unwrap();
    let config = ConfigLoader::load_from_file(&explicit).unwrap();
    config.ensure_valid().unwrap();

    let reconciler = Reconciler::from_config(tree.path().to_path_buf(), &config);
    let generated = reconciler
        .reconcile(Mode::GenerateSidecars, &mut NullSink)
        .unwrap();

    // a.txt, picohash.toml and sub/b.txt; .git is never entered
    assert_eq!(generated.computed, 3);
    assert!(tree.path().join("a.txt.blake3").exists());
    assert!(!tree.path().join(".git/HEAD.blake3").exists());

    let joined = reconciler
        .execute(picohash::reconcile::Operation::JoinSidecars, &mut NullSink)
        .unwrap();
    assert_eq!(joined.collected, 3);
    assert!(tree.path().join("SUMS.blake3").exists());

    let verified = reconciler
        .reconcile(Mode::VerifyAggregate, &mut NullSink)
        .unwrap();
    assert_eq!(verified.verified, 3);
    assert!(verified.is_clean());
}
