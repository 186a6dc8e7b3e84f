//! Clawsino: command-line client with persisted agent identities
//!
//! Agents authenticate by Ed25519 challenge-response; the keypair and the last
//! session live in a local credential store so later commands can reuse them.

pub mod auth;
pub mod config;
pub mod credentials;
pub mod device;
pub mod error;
pub mod identity;
pub mod logging;
pub mod remote;
pub mod session;
pub mod tooling;
