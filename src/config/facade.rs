//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::ClawsinoConfig;
use config::ConfigError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the global file and environment.
    pub fn load() -> Result<ClawsinoConfig, ConfigError> {
        MergeService::load()
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<ClawsinoConfig, ConfigError> {
        MergeService::load_from_file(path)
    }

    /// Load from `path` when given, otherwise from the standard sources.
    pub fn load_optional(path: Option<&Path>) -> Result<ClawsinoConfig, ConfigError> {
        match path {
            Some(p) => Self::load_from_file(p),
            None => Self::load(),
        }
    }

    /// Create default configuration.
    pub fn default() -> ClawsinoConfig {
        ClawsinoConfig::default()
    }
}
