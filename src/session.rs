//! Session Token Resolver
//!
//! Picks the bearer token for an invocation: a non-blank explicit `--token`
//! always wins, otherwise the stored session of the `--agent` handle is used.
//! Expiry never changes the result; an expired stored token is passed through.

use crate::credentials::{CredentialRepository, CredentialStore};
use crate::error::ApiError;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    Explicit,
    StoredAgent { handle: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedToken {
    pub token: String,
    pub source: TokenSource,
    /// Stored expiry for agent sessions, as persisted
    pub expires_at: Option<String>,
}

impl ResolvedToken {
    /// Parsed expiry; None when absent or not RFC 3339.
    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        let raw = self.expires_at.as_deref()?.trim();
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Unknown expiry counts as not expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry().map(|expiry| expiry <= now).unwrap_or(false)
    }

    pub fn agent_handle(&self) -> Option<&str> {
        match &self.source {
            TokenSource::StoredAgent { handle } => Some(handle),
            TokenSource::Explicit => None,
        }
    }
}

/// Resolve against an already loaded store.
pub fn resolve_session_token(
    store: &CredentialStore,
    explicit: &str,
    agent: Option<&str>,
) -> Option<ResolvedToken> {
    if let Some(token) = explicit_token(explicit) {
        return Some(token);
    }
    let handle = agent.map(str::trim).filter(|h| !h.is_empty())?;
    let identity = store.agent(handle)?;
    let token = identity.last_session_token.trim();
    if token.is_empty() {
        return None;
    }
    let expires_at = identity.last_session_expires_at.trim();
    Some(ResolvedToken {
        token: token.to_string(),
        source: TokenSource::StoredAgent {
            handle: handle.to_string(),
        },
        expires_at: (!expires_at.is_empty()).then(|| expires_at.to_string()),
    })
}

fn explicit_token(explicit: &str) -> Option<ResolvedToken> {
    let token = explicit.trim();
    (!token.is_empty()).then(|| ResolvedToken {
        token: token.to_string(),
        source: TokenSource::Explicit,
        expires_at: None,
    })
}

/// Resolver that reads the credential store only when it has to.
pub struct SessionTokenResolver<'a> {
    repository: &'a dyn CredentialRepository,
}

impl<'a> SessionTokenResolver<'a> {
    pub fn new(repository: &'a dyn CredentialRepository) -> Self {
        Self { repository }
    }

    pub fn resolve(
        &self,
        explicit: &str,
        agent: Option<&str>,
    ) -> Result<Option<ResolvedToken>, ApiError> {
        if let Some(token) = explicit_token(explicit) {
            return Ok(Some(token));
        }
        if agent.map(str::trim).filter(|h| !h.is_empty()).is_none() {
            return Ok(None);
        }

        let store = self.repository.load()?;
        let resolved = resolve_session_token(&store, explicit, agent);
        if let Some(token) = &resolved {
            if token.is_expired_at(Utc::now()) {
                tracing::warn!(
                    handle = token.agent_handle().unwrap_or_default(),
                    expires_at = token.expires_at.as_deref().unwrap_or_default(),
                    "Stored agent session has expired; the service may reject it"
                );
            }
        }
        Ok(resolved)
    }
}
