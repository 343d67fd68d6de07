//! Target directory config file source: <root>/.picohash.toml

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use std::path::Path;

/// Config file name looked up in the target directory.
pub const WORKSPACE_CONFIG_FILE: &str = ".picohash.toml";

/// Add the target directory config file to the builder if it exists.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let path = root.join(WORKSPACE_CONFIG_FILE);
    if path.is_file() {
        Ok(builder.add_source(File::from(path.as_path()).required(false)))
    } else {
        Ok(builder)
    }
}
