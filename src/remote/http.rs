//! reqwest adapter for [`RemoteApi`].

use super::{ApiRequest, HttpMethod, RemoteApi};
use crate::error::ApiError;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde_json::{Map, Value};
use std::time::Duration;

pub struct HttpRemoteClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRemoteClient {
    /// Build a client for `base_url`. Every request is bounded by `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("clawsino/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn transport_error(url: &str, err: reqwest::Error) -> ApiError {
    let message = if err.is_timeout() {
        format!("timed out: {}", err)
    } else {
        err.to_string()
    };
    ApiError::Transport {
        url: url.to_string(),
        message,
    }
}

#[async_trait]
impl RemoteApi for HttpRemoteClient {
    async fn call(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let url = self.url_for(&request.path);
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
        }
        .header(ACCEPT, "application/json");
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::debug!(method = ?request.method, url = %url, "Sending request");
        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| transport_error(&url, e))?;
        tracing::debug!(status = status.as_u16(), url = %url, "Received response");

        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                url,
                body: text,
            });
        }
        if text.trim().is_empty() {
            return Ok(Value::Object(Map::new()));
        }
        serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!("{} returned a non-JSON body: {}", url, e))
        })
    }
}
