//! Session tokens and the in-memory session store.
//!
//! Tokens are opaque 256-bit random values; there is nothing to decode in
//! them. [`SessionStore::regenerate`] is the fixation defense: after a
//! successful authentication the old identity is destroyed and a fresh token
//! issued, atomically from the caller's perspective.

use base64::{prelude::BASE64_URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::{rngs::OsRng, TryRngCore};
use serde::Serialize;

use crate::{
    account::AccountId,
    error::{Error, SessionError},
};

/// Opaque session token with 256 bits of entropy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: &str) -> Self {
        Self(token.to_string())
    }

    pub fn new_random() -> Self {
        let mut bytes = [0u8; 32];
        OsRng
            .try_fill_bytes(&mut bytes)
            .expect("OS RNG failure - system entropy source unavailable");
        Self(BASE64_URL_SAFE_NO_PAD.encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionToken {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// An established session identity.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: SessionToken,
    pub account_id: AccountId,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::minutes(30),
        }
    }
}

/// In-memory session store, created once at startup and shared by reference.
/// Sessions are lost on restart.
pub struct SessionStore {
    sessions: DashMap<String, Session>,
    config: SessionConfig,
}

impl SessionStore {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            config,
        }
    }

    /// Establish a new session for an account.
    pub fn create(
        &self,
        account_id: &AccountId,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Session {
        let now = Utc::now();
        let session = Session {
            token: SessionToken::new_random(),
            account_id: account_id.clone(),
            ip_address,
            user_agent,
            created_at: now,
            expires_at: now + self.config.ttl,
        };
        self.sessions
            .insert(session.token.as_str().to_string(), session.clone());
        session
    }

    /// Look up a session by token. Expired sessions are removed on access.
    pub fn get(&self, token: &SessionToken) -> Result<Session, Error> {
        let session = self
            .sessions
            .get(token.as_str())
            .map(|entry| entry.clone())
            .ok_or(Error::Session(SessionError::NotFound))?;

        if session.expires_at <= Utc::now() {
            self.sessions.remove(token.as_str());
            return Err(Error::Session(SessionError::Expired));
        }

        Ok(session)
    }

    /// Replace a session with a fresh identity.
    ///
    /// The new session is inserted before the old token is removed, so at no
    /// point does the account lack a valid session; the old token is never
    /// reusable afterwards.
    pub fn regenerate(&self, token: &SessionToken) -> Result<Session, Error> {
        let old = self.get(token)?;
        let fresh = self.create(&old.account_id, old.ip_address, old.user_agent);
        self.sessions.remove(token.as_str());

        tracing::debug!(account_id = %fresh.account_id, "session regenerated");
        Ok(fresh)
    }

    /// Destroy a session. Unknown tokens are not an error.
    pub fn destroy(&self, token: &SessionToken) {
        self.sessions.remove(token.as_str());
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
