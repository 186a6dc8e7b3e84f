//! Error types for the Clawsino client.
//!
//! Every failure in the identity and authentication path surfaces as an
//! [`ApiError`] and aborts the current command.

use std::path::PathBuf;
use thiserror::Error;

/// Credential store failures.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on credential store {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed credential store {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize credential store: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Top-level error returned by every command.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, DNS or timeout failure before a response arrived.
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// Non-2xx response; the body is kept verbatim.
    #[error("HTTP {status} {url}: {body}")]
    Http {
        status: u16,
        url: String,
        body: String,
    },

    /// A 2xx response that does not honour the expected contract.
    #[error("{context} response is missing required field '{field}'")]
    MissingField {
        context: &'static str,
        field: &'static str,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Invalid key material: {0}")]
    KeyMaterial(String),

    #[error("No stored identity for agent '{0}'")]
    UnknownAgent(String),

    #[error("A session token is required for {0} (pass --token, or --agent with a stored session)")]
    TokenRequired(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
