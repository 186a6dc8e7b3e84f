//! MergeService: orchestrates sources, applies defaults, deserializes to ClawsinoConfig.

use crate::config::sources::{environment, file};
use crate::config::{ClawsinoConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};
use std::path::Path;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("timeout_secs", DEFAULT_TIMEOUT_SECS)?
            .set_default("reauth_expired", false)
    }

    /// Load config from standard sources.
    /// Precedence: defaults (lowest) -> global file -> environment (highest).
    pub fn load() -> Result<ClawsinoConfig, ConfigError> {
        let builder = Self::builder_with_defaults()?;
        let builder = file::add_global(builder)?;
        let builder = environment::add_to_builder(builder)?;

        builder.build()?.try_deserialize()
    }

    /// Load config from a specific file with environment overlay.
    /// The global file is skipped.
    pub fn load_from_file(path: &Path) -> Result<ClawsinoConfig, ConfigError> {
        let builder = Self::builder_with_defaults()?;
        let builder = file::add_path(builder, path, true);
        let builder = environment::add_to_builder(builder)?;

        builder.build()?.try_deserialize()
    }
}
