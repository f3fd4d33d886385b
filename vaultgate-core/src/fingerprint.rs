//! Client fingerprinting for rate limiting.
//!
//! The fingerprint is a SHA-256 digest over connection and header attributes,
//! used only as a map key. It is deliberately unsalted so the same client
//! keys to the same window across requests, and one-way so the attributes
//! cannot be recovered from stored keys.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Connection and header attributes contributing to the fingerprint.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip: String,
    pub user_agent: String,
    pub accept_language: String,
    pub accept_encoding: String,
    pub connection: String,
}

/// Opaque derived client identity, usable as a map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Derive a fingerprint from client attributes.
    pub fn derive(info: &ClientInfo) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(info.ip.as_bytes());
        for part in [
            &info.user_agent,
            &info.accept_language,
            &info.accept_encoding,
            &info.connection,
        ] {
            hasher.update(b"|");
            hasher.update(part.as_bytes());
        }
        Fingerprint(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
