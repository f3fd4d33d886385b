//! Bounded per-account password history for reuse prevention.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::hasher::PasswordHasher;

/// Number of past hashes retained per account.
pub const HISTORY_DEPTH: usize = 5;

/// A single retained hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub hash: String,
    pub created_at: DateTime<Utc>,
}

/// Ordered list of the most recent password hashes, oldest first.
///
/// The history is a value type: callers mutate a copy and persist it back on
/// the account's password record. Seeded with the initial hash at
/// registration, so the current hash is always a member.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PasswordHistory {
    entries: Vec<HistoryEntry>,
}

impl PasswordHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a fresh history with an account's first hash.
    pub fn seeded(hash: impl Into<String>, now: DateTime<Utc>) -> Self {
        let mut history = Self::new();
        history.push(hash, now);
        history
    }

    /// Append a hash, evicting the oldest entry beyond [`HISTORY_DEPTH`].
    pub fn push(&mut self, hash: impl Into<String>, now: DateTime<Utc>) {
        self.entries.push(HistoryEntry {
            hash: hash.into(),
            created_at: now,
        });
        if self.entries.len() > HISTORY_DEPTH {
            self.entries.remove(0);
        }
    }

    /// True if the plaintext matches any retained hash.
    ///
    /// Verifies sequentially and short-circuits on the first match; each
    /// probe costs a full slow-hash verification.
    pub fn contains(&self, plaintext: &str, hasher: &PasswordHasher) -> bool {
        self.entries
            .iter()
            .any(|entry| hasher.verify(plaintext, &entry.hash))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::hasher::HasherConfig;

    fn test_hasher() -> PasswordHasher {
        PasswordHasher::new("pepper", HasherConfig::insecure_fast())
    }

    #[test]
    fn test_push_evicts_oldest_beyond_depth() {
        let now = Utc::now();
        let mut history = PasswordHistory::new();
        for i in 0..6 {
            history.push(format!("hash-{i}"), now);
        }

        assert_eq!(history.len(), HISTORY_DEPTH);
        assert_eq!(history.entries()[0].hash, "hash-1");
        assert_eq!(history.entries()[4].hash, "hash-5");
    }

    #[test]
    fn test_contains_matches_stored_hash() {
        let hasher = test_hasher();
        let now = Utc::now();

        let mut history = PasswordHistory::seeded(hasher.hash("first-pass").unwrap(), now);
        history.push(hasher.hash("second-pass").unwrap(), now);

        assert!(history.contains("first-pass", &hasher));
        assert!(history.contains("second-pass", &hasher));
        assert!(!history.contains("never-used", &hasher));
    }

    #[test]
    fn test_evicted_hash_no_longer_matches() {
        let hasher = test_hasher();
        let now = Utc::now();

        let mut history = PasswordHistory::seeded(hasher.hash("oldest").unwrap(), now);
        for i in 0..HISTORY_DEPTH {
            history.push(hasher.hash(&format!("pass-{i}")).unwrap(), now);
        }

        assert!(!history.contains("oldest", &hasher));
        assert!(history.contains("pass-0", &hasher));
    }

    #[test]
    fn test_empty_history() {
        let history = PasswordHistory::new();
        assert!(history.is_empty());
        assert!(!history.contains("anything", &test_hasher()));
    }
}
