//! Configuration
//!
//! Layered configuration for the client: built-in defaults, the optional global
//! `config.toml`, and `CLAWSINO__*` environment variables, in that order.

mod facade;
mod merge;
mod paths;
pub mod sources;

pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://clawsino.anma-services.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Effective client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClawsinoConfig {
    /// Remote service base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Credential store location; None means the XDG default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_file: Option<PathBuf>,

    /// Re-run agent login when the stored session for `--agent` has expired
    #[serde(default)]
    pub reauth_expired: bool,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for ClawsinoConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            credentials_file: None,
            reauth_expired: false,
            logging: LoggingConfig::default(),
        }
    }
}
