//! Credential Store
//!
//! Durable persistence of per-handle agent identities and device-link public keys.
//! The store is a single JSON document:
//!
//! ```json
//! {
//!   "agents": { "<handle>": { "publicKey": "...", "privateKeyPkcs8": "...", ... } },
//!   "devices": { "<handle>": "<base64 public key>" }
//! }
//! ```
//!
//! A missing file is an empty store. Saves are atomic (temp file + rename).

pub mod file;
pub mod path;

pub use file::FileCredentialRepository;
pub use path::resolve_credentials_path;

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Persisted identity of one agent handle.
///
/// The key fields are written once and never replaced; only the session
/// fields change after a successful login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentIdentity {
    /// Raw 32-byte Ed25519 verifying key, base64
    #[serde(default)]
    pub public_key: String,

    /// PKCS#8 DER signing key, base64
    #[serde(default)]
    pub private_key_pkcs8: String,

    #[serde(default)]
    pub last_session_token: String,

    /// RFC 3339 timestamp as returned by the service
    #[serde(default)]
    pub last_session_expires_at: String,
}

impl AgentIdentity {
    pub fn has_keypair(&self) -> bool {
        !self.public_key.is_empty() && !self.private_key_pkcs8.is_empty()
    }
}

/// Device-link pseudo-identity: a public key with no private half.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceLinkRecord {
    pub public_key: String,
}

/// Root persisted object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialStore {
    #[serde(default)]
    pub agents: BTreeMap<String, AgentIdentity>,

    #[serde(default)]
    pub devices: BTreeMap<String, DeviceLinkRecord>,
}

impl CredentialStore {
    pub fn agent(&self, handle: &str) -> Option<&AgentIdentity> {
        self.agents.get(handle)
    }

    pub fn device(&self, handle: &str) -> Option<&DeviceLinkRecord> {
        self.devices.get(handle)
    }
}

/// Storage port for the credential store.
pub trait CredentialRepository: Send + Sync {
    /// Read the store; a missing backing file yields an empty store.
    fn load(&self) -> Result<CredentialStore, ApiError>;

    /// Replace the persisted store with `store` atomically.
    fn save(&self, store: &CredentialStore) -> Result<(), ApiError>;

    /// Location of the backing file, for diagnostics.
    fn path(&self) -> &Path;
}
