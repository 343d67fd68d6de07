//! CLI parse: clap types for picohash. No behavior; definitions only.

use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// picohash - BLAKE3 checksum manifests for directory trees
#[derive(Parser, Debug)]
#[command(name = "picohash")]
#[command(version)]
#[command(about = "Generate and verify BLAKE3 checksum manifests for a directory tree")]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Target directory
    #[arg(default_value = ".")]
    pub directory: PathBuf,

    /// Verify files against recorded digests instead of generating them
    #[arg(short = 'c', long, conflicts_with_all = ["join", "split", "remove"])]
    pub check: bool,

    /// Use the aggregate manifest (hashes.b3) instead of per-file sidecars
    #[arg(short = 'a', long, conflicts_with_all = ["join", "split", "remove"])]
    pub aggregate: bool,

    /// Merge every sidecar into the aggregate manifest
    #[arg(short = 'j', long, conflicts_with_all = ["split", "remove"])]
    pub join: bool,

    /// Write a sidecar for every aggregate manifest entry
    #[arg(short = 's', long, conflicts_with = "remove")]
    pub split: bool,

    /// Delete every sidecar (aggregate manifests are kept)
    #[arg(short = 'r', long)]
    pub remove: bool,

    /// Slow-media mode: no mmap, one hashing thread
    #[arg(long)]
    pub hdd: bool,

    /// Pipe file contents through the reader program into the hasher
    #[arg(long = "cat", conflicts_with = "builtin")]
    pub piped: bool,

    /// Hash in process instead of running an external program
    #[arg(long)]
    pub builtin: bool,

    /// Print version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    pub version: Option<bool>,

    /// Configuration file path (replaces the global and directory config files)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Final report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Disable colored status lines
    #[arg(long)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Disable logging
    #[arg(long)]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stderr, stdout, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}
