//! Agent Identity Manager
//!
//! Ensures persisted identity material exists for a handle. Agents get an
//! Ed25519 signing keypair; device links get a random 32-byte public key.
//! Both go through [`ensure_identity`]: existing material is never replaced,
//! and nothing here writes to disk. Callers save the store after a generation.

pub mod keys;

use crate::credentials::{AgentIdentity, CredentialStore, DeviceLinkRecord};
use crate::error::ApiError;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// A persisted record that owns identity material.
pub trait PersistedIdentity: Clone + Default {
    fn has_material(&self) -> bool;

    /// Fill in identity material, leaving other fields untouched.
    fn generate_material(&mut self) -> Result<(), ApiError>;
}

impl PersistedIdentity for AgentIdentity {
    fn has_material(&self) -> bool {
        self.has_keypair()
    }

    fn generate_material(&mut self) -> Result<(), ApiError> {
        let pair = keys::generate_keypair()?;
        self.public_key = pair.public_key;
        self.private_key_pkcs8 = pair.private_key_pkcs8;
        Ok(())
    }
}

impl PersistedIdentity for DeviceLinkRecord {
    fn has_material(&self) -> bool {
        !self.public_key.trim().is_empty()
    }

    fn generate_material(&mut self) -> Result<(), ApiError> {
        self.public_key = keys::random_public_key();
        Ok(())
    }
}

/// Outcome of [`ensure_identity`].
#[derive(Debug)]
pub struct Ensured<'a, T> {
    pub record: &'a mut T,
    /// True when material was generated and the store needs saving.
    pub generated: bool,
}

/// Return the record for `handle`, generating material only if it has none.
///
/// On a generation failure the map is left as it was.
pub fn ensure_identity<'a, T: PersistedIdentity>(
    records: &'a mut BTreeMap<String, T>,
    handle: &str,
) -> Result<Ensured<'a, T>, ApiError> {
    match records.entry(handle.to_string()) {
        Entry::Occupied(entry) if entry.get().has_material() => Ok(Ensured {
            record: entry.into_mut(),
            generated: false,
        }),
        entry => {
            let mut candidate = match &entry {
                Entry::Occupied(existing) => existing.get().clone(),
                Entry::Vacant(_) => T::default(),
            };
            candidate.generate_material()?;
            let record = entry.or_default();
            *record = candidate;
            Ok(Ensured {
                record,
                generated: true,
            })
        }
    }
}

/// Ensure `handle` has a signing keypair, generating one on first use.
pub fn ensure_keypair<'a>(
    store: &'a mut CredentialStore,
    handle: &str,
) -> Result<&'a AgentIdentity, ApiError> {
    let ensured = ensure_identity(&mut store.agents, handle)?;
    if ensured.generated {
        tracing::info!(handle, "Generated new agent signing keypair");
    }
    Ok(ensured.record)
}

/// Ensure `handle` has a device-link public key, generating one on first use.
/// Returns the key and whether it was generated.
pub fn ensure_device_key(
    store: &mut CredentialStore,
    handle: &str,
) -> Result<(String, bool), ApiError> {
    let ensured = ensure_identity(&mut store.devices, handle)?;
    if ensured.generated {
        tracing::info!(handle, "Generated new device-link public key");
    }
    Ok((ensured.record.public_key.clone(), ensured.generated))
}
