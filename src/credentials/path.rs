//! Credential store path resolution.

use crate::config::xdg;
use crate::error::ApiError;
use std::path::PathBuf;

pub const CREDENTIALS_ENV_VAR: &str = "CLAWSINO_CREDENTIALS_FILE";

/// Resolve the credential store path with precedence: CLI flag,
/// `CLAWSINO_CREDENTIALS_FILE`, config file, then
/// `$XDG_CONFIG_HOME/clawsino/credentials.json`.
pub fn resolve_credentials_path(
    cli_file: Option<PathBuf>,
    config_file: Option<PathBuf>,
) -> Result<PathBuf, ApiError> {
    if let Some(p) = cli_file {
        if !p.as_os_str().is_empty() {
            return Ok(p);
        }
    }
    if let Ok(env_path) = std::env::var(CREDENTIALS_ENV_VAR) {
        if !env_path.trim().is_empty() {
            return Ok(PathBuf::from(env_path));
        }
    }
    if let Some(p) = config_file {
        if !p.as_os_str().is_empty() {
            return Ok(p);
        }
    }
    xdg::default_credentials_path()
}
