//! Challenge-Response Authenticator
//!
//! Drives `register -> sign -> verify` for an agent handle and records the
//! resulting session in the credential store.
//!
//! Ordering matters: the keypair is saved before any network traffic, so a
//! failed round-trip never loses the identity and a retry reuses the same
//! public key. The store is reloaded before the session is written back.

use crate::credentials::CredentialRepository;
use crate::error::ApiError;
use crate::identity::{ensure_keypair, keys};
use crate::remote::{endpoints, required_str, RemoteApi};
use serde::Serialize;
use serde_json::Value;

/// Registration challenge issued by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub challenge_id: String,
    pub message_to_sign: String,
}

impl Challenge {
    pub fn from_response(response: &Value) -> Result<Self, ApiError> {
        Ok(Self {
            challenge_id: required_str(response, "agent register", "challengeId")?,
            message_to_sign: required_str(response, "agent register", "messageToSign")?,
        })
    }
}

/// Session issued after a verified signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_token: String,
    pub expires_at: String,
}

impl Session {
    pub fn from_response(response: &Value) -> Result<Self, ApiError> {
        Ok(Self {
            session_token: required_str(response, "agent verify", "sessionToken")?,
            expires_at: required_str(response, "agent verify", "expiresAt")?,
        })
    }
}

/// Result of a login, with the public key the session is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutcome {
    pub handle: String,
    pub public_key: String,
    #[serde(flatten)]
    pub session: Session,
}

pub struct Authenticator<'a> {
    repository: &'a dyn CredentialRepository,
    remote: &'a dyn RemoteApi,
}

impl<'a> Authenticator<'a> {
    pub fn new(repository: &'a dyn CredentialRepository, remote: &'a dyn RemoteApi) -> Self {
        Self { repository, remote }
    }

    /// Authenticate `handle` and persist the new session. The handle is used
    /// verbatim as the store key; callers normalize it.
    pub async fn login(&self, handle: &str) -> Result<LoginOutcome, ApiError> {
        if handle.trim().is_empty() {
            return Err(ApiError::ConfigError(
                "Agent handle cannot be empty".to_string(),
            ));
        }

        let mut store = self.repository.load()?;
        let identity = ensure_keypair(&mut store, handle)?.clone();
        self.repository.save(&store)?;
        tracing::debug!(
            handle,
            path = %self.repository.path().display(),
            "Agent keypair persisted"
        );

        let response = self.remote.call(endpoints::agent_register(handle)).await?;
        let challenge = Challenge::from_response(&response)?;
        tracing::debug!(handle, challenge_id = %challenge.challenge_id, "Received challenge");

        let signature = keys::sign_message(&identity, &challenge.message_to_sign)?;

        let response = self
            .remote
            .call(endpoints::agent_verify(
                &challenge.challenge_id,
                &identity.public_key,
                &signature,
            ))
            .await?;
        let session = Session::from_response(&response)?;

        let mut store = self.repository.load()?;
        let record = store
            .agents
            .entry(handle.to_string())
            .or_insert_with(|| identity.clone());
        if !record.has_keypair() {
            record.public_key = identity.public_key.clone();
            record.private_key_pkcs8 = identity.private_key_pkcs8.clone();
        }
        record.last_session_token = session.session_token.clone();
        record.last_session_expires_at = session.expires_at.clone();
        self.repository.save(&store)?;

        tracing::info!(handle, expires_at = %session.expires_at, "Agent session stored");
        Ok(LoginOutcome {
            handle: handle.to_string(),
            public_key: identity.public_key,
            session,
        })
    }
}
