//! Account records as seen by the security core.
//!
//! The persistence collaborator owns the full account row; this crate only
//! touches the credential material and lockout state.

use base64::{prelude::BASE64_URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use rand::{rngs::OsRng, TryRngCore};
use serde::{Deserialize, Serialize};

use crate::{lockout::LockoutState, password::PasswordHistory};

/// A unique, stable identifier for an account. Treat as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    /// Generate a prefixed random ID with 96 bits of entropy.
    pub fn new_random() -> Self {
        let mut bytes = [0u8; 12];
        OsRng
            .try_fill_bytes(&mut bytes)
            .expect("OS RNG failure - system entropy source unavailable");
        Self(format!("acct_{}", BASE64_URL_SAFE_NO_PAD.encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Credential material for an account.
///
/// `history` always contains `current_hash` as its most recent entry; the
/// reuse check at password change therefore covers the current password too.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordRecord {
    pub current_hash: String,
    pub history: PasswordHistory,
    pub last_changed_at: DateTime<Utc>,
}

impl PasswordRecord {
    /// Record for a freshly hashed first password, history seeded.
    pub fn new(hash: String, now: DateTime<Utc>) -> Self {
        Self {
            history: PasswordHistory::seeded(hash.clone(), now),
            current_hash: hash,
            last_changed_at: now,
        }
    }

    /// Replace the current password, retaining the old hash in history.
    pub fn rotate(&mut self, new_hash: String, now: DateTime<Utc>) {
        self.history.push(new_hash.clone(), now);
        self.current_hash = new_hash;
        self.last_changed_at = now;
    }
}

/// An account row as surfaced by the persistence collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub name: Option<String>,
    pub password: PasswordRecord,
    pub lockout: LockoutState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating an account. The repository assigns the ID and
/// timestamps.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub name: Option<String>,
    pub password: PasswordRecord,
}
