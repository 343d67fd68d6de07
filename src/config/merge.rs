//! Merge rules: built-in defaults that every other source overrides.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("hashing.program", "b3sum")?
        .set_default("hashing.reader", "cat")?
        .set_default("hashing.strategy", "direct")?
        .set_default("hashing.slow_media", false)?
        .set_default("manifest.aggregate_name", "hashes.b3")?
        .set_default("manifest.sidecar_extension", "b3")?
        .set_default("walk.follow_symlinks", false)?
        .set_default("logging.level", "warn")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")
}
