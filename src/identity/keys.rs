//! Ed25519 key material encoding and challenge signing.

use crate::credentials::AgentIdentity;
use crate::error::ApiError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use ed25519_dalek::pkcs8::{DecodePrivateKey, EncodePrivateKey};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;

/// Length of a raw public key (Ed25519 verifying key or device pseudo-key).
pub const PUBLIC_KEY_LEN: usize = 32;

/// Base64 text forms of a freshly generated keypair.
#[derive(Debug, Clone)]
pub struct EncodedKeypair {
    pub public_key: String,
    pub private_key_pkcs8: String,
}

pub fn generate_keypair() -> Result<EncodedKeypair, ApiError> {
    let signing_key = SigningKey::generate(&mut OsRng);
    encode_keypair(&signing_key)
}

pub fn encode_keypair(signing_key: &SigningKey) -> Result<EncodedKeypair, ApiError> {
    let der = signing_key
        .to_pkcs8_der()
        .map_err(|e| ApiError::KeyMaterial(format!("Failed to encode private key: {}", e)))?;
    Ok(EncodedKeypair {
        public_key: BASE64.encode(signing_key.verifying_key().as_bytes()),
        private_key_pkcs8: BASE64.encode(der.as_bytes()),
    })
}

/// 32 random bytes, base64. Used as the device-link pseudo public key.
pub fn random_public_key() -> String {
    let mut bytes = [0u8; PUBLIC_KEY_LEN];
    OsRng.fill_bytes(&mut bytes);
    BASE64.encode(bytes)
}

pub fn decode_verifying_key(encoded: &str) -> Result<VerifyingKey, ApiError> {
    let bytes = BASE64
        .decode(encoded.trim())
        .map_err(|e| ApiError::KeyMaterial(format!("Public key is not valid base64: {}", e)))?;
    let raw: [u8; PUBLIC_KEY_LEN] = bytes.as_slice().try_into().map_err(|_| {
        ApiError::KeyMaterial(format!(
            "Public key must be {} bytes, got {}",
            PUBLIC_KEY_LEN,
            bytes.len()
        ))
    })?;
    VerifyingKey::from_bytes(&raw)
        .map_err(|e| ApiError::KeyMaterial(format!("Public key is not a valid point: {}", e)))
}

/// Decode the stored signing key and check it matches the stored public key.
pub fn signing_key(identity: &AgentIdentity) -> Result<SigningKey, ApiError> {
    if !identity.has_keypair() {
        return Err(ApiError::KeyMaterial(
            "Identity has no keypair".to_string(),
        ));
    }
    let der = BASE64.decode(identity.private_key_pkcs8.trim()).map_err(|e| {
        ApiError::KeyMaterial(format!("Private key is not valid base64: {}", e))
    })?;
    let signing_key = SigningKey::from_pkcs8_der(&der)
        .map_err(|e| ApiError::KeyMaterial(format!("Private key is not PKCS#8 Ed25519: {}", e)))?;

    let stored_public = decode_verifying_key(&identity.public_key)?;
    if signing_key.verifying_key() != stored_public {
        return Err(ApiError::KeyMaterial(
            "Stored public key does not match the private key".to_string(),
        ));
    }
    Ok(signing_key)
}

/// Detached signature over the UTF-8 bytes of `message`, base64.
pub fn sign_message(identity: &AgentIdentity, message: &str) -> Result<String, ApiError> {
    let signing_key = signing_key(identity)?;
    let signature = signing_key.sign(message.as_bytes());
    Ok(BASE64.encode(signature.to_bytes()))
}

/// Verify a base64 signature against a base64 public key.
pub fn verify_signature(
    public_key: &str,
    message: &str,
    signature: &str,
) -> Result<bool, ApiError> {
    let verifying_key = decode_verifying_key(public_key)?;
    let bytes = BASE64
        .decode(signature.trim())
        .map_err(|e| ApiError::KeyMaterial(format!("Signature is not valid base64: {}", e)))?;
    let signature = Signature::from_slice(&bytes)
        .map_err(|e| ApiError::KeyMaterial(format!("Malformed signature: {}", e)))?;
    Ok(verifying_key.verify(message.as_bytes(), &signature).is_ok())
}
