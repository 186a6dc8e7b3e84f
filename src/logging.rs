//! Logging System
//!
//! Structured logging through `tracing`. Stdout carries command output, so logs
//! go to a file by default; `--log-output stderr` is the usual choice when
//! debugging interactively.
//!
//! Settings are layered: CLI flags ([`LogOverrides`]) win over `CLAWSINO_LOG*`
//! environment variables, which win over the config file and the built-in
//! defaults.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

pub const LOG_FILTER_ENV: &str = "CLAWSINO_LOG";
pub const LOG_FORMAT_ENV: &str = "CLAWSINO_LOG_FORMAT";
pub const LOG_OUTPUT_ENV: &str = "CLAWSINO_LOG_OUTPUT";
pub const LOG_MODULES_ENV: &str = "CLAWSINO_LOG_MODULES";
pub const LOG_FILE_ENV: &str = "CLAWSINO_LOG_FILE";

const LOG_FILE_NAME: &str = "clawsino.log";

/// Logging section of the configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// trace, debug, info, warn, error or off
    #[serde(default = "default_level")]
    pub level: String,

    /// text or json
    #[serde(default = "default_format")]
    pub format: String,

    /// stdout, stderr, file, file+stderr or both
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    /// ANSI colors; ignored when a file is among the outputs
    #[serde(default = "default_true")]
    pub color: bool,

    /// Per-target levels, e.g. `clawsino::remote = "debug"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_true() -> bool {
    true
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    LogFormat::Text.as_str().to_string()
}

fn default_output() -> String {
    LogOutput::File.as_str().to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_level(),
            format: default_format(),
            output: default_output(),
            file: None,
            color: true,
            modules: HashMap::new(),
        }
    }
}

/// Logging flags given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogOverrides {
    pub level: Option<String>,
    pub format: Option<String>,
    pub output: Option<String>,
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
        }
    }
}

impl FromStr for LogFormat {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(ApiError::ConfigError(format!(
                "Invalid log format '{}', expected text or json",
                other
            ))),
        }
    }
}

/// Where log lines are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    Stderr,
    File,
    FileAndStderr,
    /// stdout and stderr
    Both,
}

impl LogOutput {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogOutput::Stdout => "stdout",
            LogOutput::Stderr => "stderr",
            LogOutput::File => "file",
            LogOutput::FileAndStderr => "file+stderr",
            LogOutput::Both => "both",
        }
    }

    pub fn uses_file(&self) -> bool {
        matches!(self, LogOutput::File | LogOutput::FileAndStderr)
    }

    fn writer(&self, file: Option<Arc<File>>) -> BoxMakeWriter {
        match (self, file) {
            (LogOutput::FileAndStderr, Some(file)) => {
                BoxMakeWriter::new(file.and(std::io::stderr))
            }
            (LogOutput::File, Some(file)) => BoxMakeWriter::new(file),
            (LogOutput::Both, _) => BoxMakeWriter::new(std::io::stdout.and(std::io::stderr)),
            (LogOutput::Stdout, _) => BoxMakeWriter::new(std::io::stdout),
            _ => BoxMakeWriter::new(std::io::stderr),
        }
    }
}

impl FromStr for LogOutput {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "stdout" => Ok(LogOutput::Stdout),
            "stderr" => Ok(LogOutput::Stderr),
            "file" => Ok(LogOutput::File),
            "file+stderr" => Ok(LogOutput::FileAndStderr),
            "both" => Ok(LogOutput::Both),
            other => Err(ApiError::ConfigError(format!(
                "Invalid log output '{}', expected stdout, stderr, file, file+stderr or both",
                other
            ))),
        }
    }
}

/// Log file location: CLI flag, `CLAWSINO_LOG_FILE`, config, then the
/// platform state directory.
pub fn resolve_log_file_path(
    cli_file: Option<PathBuf>,
    config_file: Option<PathBuf>,
) -> Result<PathBuf, ApiError> {
    let from_env = std::env::var(LOG_FILE_ENV)
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);
    let explicit = [cli_file, from_env, config_file]
        .into_iter()
        .flatten()
        .find(|p| !p.as_os_str().is_empty());
    match explicit {
        Some(path) => Ok(path),
        None => default_log_file_path(),
    }
}

fn default_log_file_path() -> Result<PathBuf, ApiError> {
    let dirs = directories::ProjectDirs::from("", "clawsino", "clawsino").ok_or_else(|| {
        ApiError::ConfigError("Could not determine a state directory for the log file".into())
    })?;
    // state_dir exists on Linux only
    let dir = dirs.state_dir().unwrap_or_else(|| dirs.data_local_dir());
    Ok(dir.join(LOG_FILE_NAME))
}

/// Format, destination and file after layering flags, environment and config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveLogging {
    pub format: LogFormat,
    pub output: LogOutput,
    /// Set only when `output` writes to a file
    pub file: Option<PathBuf>,
}

impl EffectiveLogging {
    pub fn resolve(config: &LoggingConfig, overrides: &LogOverrides) -> Result<Self, ApiError> {
        let format: LogFormat =
            layered(overrides.format.as_deref(), LOG_FORMAT_ENV, &config.format)?;
        let output: LogOutput =
            layered(overrides.output.as_deref(), LOG_OUTPUT_ENV, &config.output)?;
        let file = if output.uses_file() {
            Some(resolve_log_file_path(
                overrides.file.clone(),
                config.file.clone(),
            )?)
        } else {
            None
        };
        Ok(Self {
            format,
            output,
            file,
        })
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LoggingConfig, overrides: &LogOverrides) -> Result<(), ApiError> {
    let installed = if config.enabled {
        let filter = env_filter(config, overrides.level.as_deref())?;
        let effective = EffectiveLogging::resolve(config, overrides)?;

        let file = match &effective.file {
            Some(path) => Some(Arc::new(open_log_file(path)?)),
            None => None,
        };
        let layer = fmt::layer()
            .with_target(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(effective.output.writer(file));

        let registry = Registry::default().with(filter);
        match effective.format {
            LogFormat::Json => registry.with(layer.json()).try_init(),
            LogFormat::Text => registry
                .with(layer.with_ansi(config.color && !effective.output.uses_file()))
                .try_init(),
        }
    } else {
        Registry::default()
            .with(EnvFilter::new("off"))
            .with(fmt::layer().with_writer(std::io::sink))
            .try_init()
    };
    installed
        .map_err(|e| ApiError::ConfigError(format!("Failed to install log subscriber: {}", e)))
}

/// A CLI value always applies; otherwise a valid value from `env_var` beats the
/// configured one.
fn layered<T: FromStr<Err = ApiError>>(
    cli: Option<&str>,
    env_var: &str,
    configured: &str,
) -> Result<T, ApiError> {
    if let Some(value) = cli {
        return value.parse();
    }
    if let Some(parsed) = std::env::var(env_var).ok().and_then(|v| v.parse().ok()) {
        return Ok(parsed);
    }
    configured.parse()
}

fn open_log_file(path: &Path) -> Result<File, ApiError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ApiError::ConfigError(format!(
                "Failed to create log directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            ApiError::ConfigError(format!("Failed to open log file {}: {}", path.display(), e))
        })
}

/// `--log-level` sets the base level. Without it `CLAWSINO_LOG` replaces the whole
/// filter, falling back to the configured level. Per-module directives from config
/// and `CLAWSINO_LOG_MODULES` (`a=debug,b=warn`) apply on top of a base level.
fn env_filter(config: &LoggingConfig, cli_level: Option<&str>) -> Result<EnvFilter, ApiError> {
    let level = match cli_level {
        Some(level) => level.trim(),
        None => {
            if let Ok(filter) = EnvFilter::try_from_env(LOG_FILTER_ENV) {
                return Ok(filter);
            }
            config.level.trim()
        }
    };
    if level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    let from_env = std::env::var(LOG_MODULES_ENV).unwrap_or_default();
    let env_pairs = from_env
        .split(',')
        .filter_map(|pair| pair.split_once('='))
        .map(|(module, level)| (module.trim(), level.trim()));
    let config_pairs = config
        .modules
        .iter()
        .map(|(module, level)| (module.as_str(), level.as_str()));

    config_pairs
        .chain(env_pairs)
        .try_fold(
            EnvFilter::new(level),
            |filter, (module, level)| -> Result<EnvFilter, ApiError> {
                let directive = format!("{}={}", module, level)
                    .parse::<Directive>()
                    .map_err(|e| {
                        ApiError::ConfigError(format!(
                            "Invalid log directive {}={}: {}",
                            module, level, e
                        ))
                    })?;
                Ok(filter.add_directive(directive))
            },
        )
}
