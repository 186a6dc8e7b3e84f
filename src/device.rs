//! Device Linking Flow
//!
//! A device handle is bound to a persisted random public key so that repeated
//! `device-start` calls claim the same remote account instead of minting a new
//! one each time. There is no private key and no signing here.

use crate::credentials::CredentialRepository;
use crate::error::ApiError;
use crate::identity::ensure_device_key;
use crate::remote::{endpoints, RemoteApi};
use serde_json::Value;

/// Response of the start endpoint plus the public key that was sent.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceLinkStart {
    pub public_key: String,
    pub response: Value,
}

impl DeviceLinkStart {
    /// Server response with `publicKey` added, as shown to the user.
    pub fn into_output(self) -> Value {
        let mut output = match self.response {
            object @ Value::Object(_) => object,
            other => serde_json::json!({ "response": other }),
        };
        output["publicKey"] = Value::String(self.public_key);
        output
    }
}

/// Start linking `device_handle`, reusing its persisted key when present.
///
/// A newly generated key is saved before the remote call.
pub async fn start_device_link(
    repository: &dyn CredentialRepository,
    remote: &dyn RemoteApi,
    device_handle: &str,
    client_name: &str,
) -> Result<DeviceLinkStart, ApiError> {
    let mut store = repository.load()?;
    let (public_key, generated) = ensure_device_key(&mut store, device_handle)?;
    if generated {
        repository.save(&store)?;
    }

    let response = remote
        .call(endpoints::device_start(&public_key, client_name, device_handle))
        .await?;
    Ok(DeviceLinkStart {
        public_key,
        response,
    })
}

/// Forward a device code to the poll endpoint. No local state is touched.
pub async fn poll_device_link(
    remote: &dyn RemoteApi,
    device_code: &str,
) -> Result<Value, ApiError> {
    remote.call(endpoints::device_poll(device_code)).await
}
