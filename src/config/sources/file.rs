//! TOML file sources: the optional global config and an explicit `--config` file.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File, FileFormat};
use std::path::Path;

/// Add the global `$XDG_CONFIG_HOME/clawsino/config.toml` if it exists.
pub fn add_global(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    match crate::config::xdg::global_config_path() {
        Ok(path) => Ok(add_path(builder, &path, false)),
        Err(e) => {
            tracing::debug!("Skipping global config file: {}", e);
            Ok(builder)
        }
    }
}

/// Add a specific file. A required file that is missing fails the build.
pub fn add_path(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
    required: bool,
) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        File::from(path)
            .format(FileFormat::Toml)
            .required(required),
    )
}
