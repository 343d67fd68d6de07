//! Configuration System
//!
//! Layered configuration built with the `config` crate. Sources, lowest to
//! highest precedence: built-in defaults, the global config file, the
//! `.picohash.toml` file in the target directory, and `PICOHASH__*`
//! environment variables. CLI flags are applied on top by the caller.

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use config::{Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod merge;
mod sources;

pub use sources::global_file::global_config_path;
pub use sources::workspace_file::WORKSPACE_CONFIG_FILE;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PicohashConfig {
    #[serde(default)]
    pub hashing: HashingConfig,

    #[serde(default)]
    pub manifest: ManifestConfig,

    #[serde(default)]
    pub walk: WalkConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How digests are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashStrategy {
    /// `b3sum <path>`
    #[default]
    Direct,
    /// `cat <path> | b3sum`
    Piped,
    /// BLAKE3 computed in process
    Builtin,
}

/// Hash program settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashingConfig {
    /// Hash program executable
    #[serde(default = "default_program")]
    pub program: String,

    /// Extra arguments placed before the file path
    #[serde(default)]
    pub args: Vec<String>,

    /// Reader program feeding the hash program in piped mode
    #[serde(default = "default_reader")]
    pub reader: String,

    #[serde(default)]
    pub strategy: HashStrategy,

    /// Single-threaded, no-mmap hashing for external drives
    #[serde(default)]
    pub slow_media: bool,
}

fn default_program() -> String {
    "b3sum".to_string()
}

fn default_reader() -> String {
    "cat".to_string()
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: Vec::new(),
            reader: default_reader(),
            strategy: HashStrategy::default(),
            slow_media: false,
        }
    }
}

/// Manifest file naming
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestConfig {
    /// Aggregate manifest file name in the target root
    #[serde(default = "default_aggregate_name")]
    pub aggregate_name: String,

    /// Sidecar extension, without the leading dot
    #[serde(default = "default_sidecar_extension")]
    pub sidecar_extension: String,
}

fn default_aggregate_name() -> String {
    "hashes.b3".to_string()
}

fn default_sidecar_extension() -> String {
    "b3".to_string()
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            aggregate_name: default_aggregate_name(),
            sidecar_extension: default_sidecar_extension(),
        }
    }
}

/// Directory traversal settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalkConfig {
    /// Follow symbolic links (off by default; only regular files are hashed)
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Path component names to skip (e.g. ".git")
    #[serde(default)]
    pub ignore: Vec<String>,
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Hashing(String),
    Manifest(String),
    Walk(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Hashing(msg) => write!(f, "hashing: {}", msg),
            ValidationError::Manifest(msg) => write!(f, "manifest: {}", msg),
            ValidationError::Walk(msg) => write!(f, "walk: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl HashingConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.program.trim().is_empty() {
            return Err("program cannot be empty".to_string());
        }
        if self.strategy == HashStrategy::Piped && self.reader.trim().is_empty() {
            return Err("reader cannot be empty in piped mode".to_string());
        }
        Ok(())
    }
}

impl ManifestConfig {
    pub fn validate(&self) -> Result<(), String> {
        let ext = self.sidecar_extension.as_str();
        if ext.is_empty() || ext.contains('.') || ext.contains('/') || ext.contains('\\') {
            return Err(format!("invalid sidecar extension '{}'", ext));
        }
        let name = self.aggregate_name.as_str();
        if name.contains('/') || name.contains('\\') {
            return Err(format!("aggregate name '{}' must be a plain file name", name));
        }
        if !name.ends_with(&format!(".{}", ext)) {
            return Err(format!(
                "aggregate name '{}' must end with '.{}' so it is never hashed",
                name, ext
            ));
        }
        Ok(())
    }
}

impl PicohashConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.hashing.validate() {
            errors.push(ValidationError::Hashing(e));
        }
        if let Err(e) = self.manifest.validate() {
            errors.push(ValidationError::Manifest(e));
        }
        for pattern in &self.walk.ignore {
            if pattern.trim().is_empty() {
                errors.push(ValidationError::Walk("empty ignore pattern".to_string()));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and fold the errors into one `ApiError`.
    pub fn ensure_valid(&self) -> Result<(), ApiError> {
        self.validate().map_err(|errors| {
            let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                msgs.join("\n")
            ))
        })
    }
}

/// Loads [`PicohashConfig`] from the layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a target directory: defaults, global file,
    /// `<root>/.picohash.toml`, then environment.
    pub fn load(root: &Path) -> Result<PicohashConfig, ApiError> {
        let builder = merge::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = sources::workspace_file::add_to_builder(builder, root)?;
        let config: PicohashConfig = builder
            .add_source(environment())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Load configuration from an explicit file; it replaces the global and
    /// target-root files.
    pub fn load_from_file(path: &Path) -> Result<PicohashConfig, ApiError> {
        if !path.is_file() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let config: PicohashConfig = merge::builder_with_defaults()?
            .add_source(File::from(path).required(true))
            .add_source(environment())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise from the target directory.
    pub fn resolve(root: &Path, path: Option<&PathBuf>) -> Result<PicohashConfig, ApiError> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::load(root),
        }
    }

    /// Defaults only, with no file or environment sources.
    pub fn defaults() -> Result<PicohashConfig, ApiError> {
        let config: PicohashConfig = merge::builder_with_defaults()?.build()?.try_deserialize()?;
        Ok(config)
    }
}

fn environment() -> Environment {
    Environment::with_prefix("PICOHASH")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
