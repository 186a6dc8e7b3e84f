//! Scripted remote service and context builders shared by the integration tests.

use async_trait::async_trait;
use clawsino::config::ClawsinoConfig;
use clawsino::credentials::FileCredentialRepository;
use clawsino::error::ApiError;
use clawsino::remote::{ApiRequest, RemoteApi};
use clawsino::tooling::CliContext;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

type Handler = dyn Fn(&ApiRequest) -> Result<Value, ApiError> + Send + Sync;

/// In-memory stand-in for the service that records every request it sees.
pub struct ScriptedRemote {
    handler: Box<Handler>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedRemote {
    pub fn new(
        handler: impl Fn(&ApiRequest) -> Result<Value, ApiError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Happy-path casino: fixed challenge, session `s1` valid until 2099.
    pub fn casino() -> Arc<Self> {
        Self::new(casino_response)
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }

    pub fn find(&self, path: &str) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

#[async_trait]
impl RemoteApi for ScriptedRemote {
    async fn call(&self, request: ApiRequest) -> Result<Value, ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        (self.handler)(&request)
    }
}

pub fn casino_response(request: &ApiRequest) -> Result<Value, ApiError> {
    match request.path.as_str() {
        "/v1/agent/register" => Ok(json!({ "challengeId": "c1", "messageToSign": "sign-me" })),
        "/v1/agent/verify" => Ok(json!({
            "sessionToken": "s1",
            "expiresAt": "2099-01-01T00:00:00Z",
        })),
        "/v1/me" => Ok(json!({ "handle": "pokerstar", "balance": 1000 })),
        _ => Ok(json!({ "ok": true })),
    }
}

pub fn http_error(request: &ApiRequest, status: u16, body: &str) -> ApiError {
    ApiError::Http {
        status,
        url: format!("https://clawsino.test{}", request.path),
        body: body.to_string(),
    }
}

/// Credential store file inside a fresh temp dir.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.dir.path().join("clawsino").join("credentials.json")
    }

    pub fn repository(&self) -> FileCredentialRepository {
        FileCredentialRepository::new(self.credentials_path())
    }

    pub fn context(&self, remote: Arc<ScriptedRemote>) -> CliContext {
        self.context_with_config(ClawsinoConfig::default(), remote)
    }

    pub fn context_with_config(
        &self,
        mut config: ClawsinoConfig,
        remote: Arc<ScriptedRemote>,
    ) -> CliContext {
        config.credentials_file = Some(self.credentials_path());
        CliContext::with_parts(config, Arc::new(self.repository()), remote)
    }
}

pub fn parse_output(output: &str) -> Value {
    serde_json::from_str(output).unwrap()
}
