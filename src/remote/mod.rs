//! Remote service client.
//!
//! Everything that talks to the Clawsino service goes through the [`RemoteApi`]
//! port, so flows can be exercised against stubs. [`HttpRemoteClient`] is the
//! reqwest-backed adapter; [`endpoints`] builds the individual requests.

pub mod endpoints;
pub mod http;

pub use http::HttpRemoteClient;

use crate::error::ApiError;
use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// One JSON request against the service, relative to its base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    /// Path plus optional query, always starting with `/`
    pub path: String,
    pub bearer: Option<String>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            bearer: None,
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            bearer: None,
            body: Some(body),
        }
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

/// Port to the remote service.
///
/// Implementations return the decoded JSON body of a 2xx response (an empty
/// body is `{}`), `ApiError::Http` for any other status, and
/// `ApiError::Transport` when no response arrived.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    async fn call(&self, request: ApiRequest) -> Result<Value, ApiError>;
}

/// Read a required non-empty string member of a response object.
pub fn required_str(
    response: &Value,
    context: &'static str,
    field: &'static str,
) -> Result<String, ApiError> {
    match response.get(field).and_then(Value::as_str) {
        Some(value) if !value.trim().is_empty() => Ok(value.to_string()),
        _ => Err(ApiError::MissingField { context, field }),
    }
}
