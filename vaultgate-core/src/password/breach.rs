//! Embedded denylist of passwords seen in public credential dumps.
//!
//! Checked at registration and password change in addition to the strength
//! score: a password can satisfy every scoring rule and still be a known
//! breached credential. The default list is static and consulted offline; no
//! network lookup happens here. An operator can swap in their own entries
//! with [`BreachList::with_entries`].

/// Most common passwords from public breach corpora, stored lowercase.
const BREACHED_PASSWORDS: &[&str] = &[
    "123456",
    "123456789",
    "12345678",
    "password",
    "password1",
    "password123",
    "qwerty",
    "qwerty123",
    "abc123",
    "111111",
    "1234567",
    "letmein",
    "welcome",
    "welcome1",
    "monkey",
    "dragon",
    "football",
    "baseball",
    "iloveyou",
    "trustno1",
    "sunshine",
    "master",
    "shadow",
    "michael",
    "superman",
    "batman",
    "princess",
    "admin",
    "admin123",
    "login",
    "passw0rd",
    "p@ssword",
    "p@ssw0rd",
    "banking123",
    "secret",
];

/// Denylist of known-breached passwords, matched case-insensitively.
pub struct BreachList {
    entries: Vec<String>,
}

impl Default for BreachList {
    fn default() -> Self {
        Self::new()
    }
}

impl BreachList {
    /// List seeded from the embedded breach corpora.
    pub fn new() -> Self {
        Self::with_entries(BREACHED_PASSWORDS.iter().map(|s| s.to_string()).collect())
    }

    /// List with operator-supplied entries. Entries are normalized to
    /// lowercase on construction.
    pub fn with_entries(entries: Vec<String>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| e.to_lowercase()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if the password appears in the denylist (case-insensitive).
    pub fn contains(&self, password: &str) -> bool {
        let lowered = password.to_lowercase();
        self.entries.iter().any(|e| *e == lowered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_breached_passwords() {
        let list = BreachList::new();
        assert!(list.contains("password"));
        assert!(list.contains("123456"));
        assert!(list.contains("p@ssw0rd"));
    }

    #[test]
    fn test_case_insensitive() {
        let list = BreachList::new();
        assert!(list.contains("PASSWORD"));
        assert!(list.contains("Qwerty123"));
    }

    #[test]
    fn test_unlisted_password_passes() {
        let list = BreachList::new();
        assert!(!list.contains("Xy9$mK@2pQ7#vL4!nR8"));
        assert!(!list.contains("correct horse battery staple"));
    }

    #[test]
    fn test_substring_does_not_match() {
        // Membership is exact, not substring: "password" inside a longer
        // string is handled by the strength scorer instead.
        let list = BreachList::new();
        assert!(!list.contains("password-but-longer"));
    }

    #[test]
    fn test_custom_entries_normalized() {
        let list = BreachList::with_entries(vec!["Hunter2!Strong".to_string()]);
        assert!(list.contains("hunter2!strong"));
        assert!(list.contains("HUNTER2!STRONG"));
        assert!(!list.contains("password"));
    }
}
