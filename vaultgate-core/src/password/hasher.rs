//! Peppered password hashing built on Argon2id.
//!
//! A process-wide secret (the "pepper") is appended to the plaintext before
//! it reaches the salted, memory-hard primitive. Unlike the per-password salt
//! stored inside the digest, the pepper never appears in the database, so a
//! leaked table of hashes cannot be attacked offline without it.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::error::{CryptoError, Error};

/// Work-factor configuration for the hashing primitive.
///
/// The defaults follow the OWASP minimum recommendation for Argon2id and are
/// intentionally slow (hundreds of milliseconds). Lower them only in tests.
#[derive(Debug, Clone)]
pub struct HasherConfig {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of iterations.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl HasherConfig {
    /// Cheap parameters for unit tests. Never use in production.
    pub fn insecure_fast() -> Self {
        Self {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }
}

/// Stateless peppered hasher. Cheap to clone; safe to share across tasks.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    pepper: String,
    config: HasherConfig,
}

impl PasswordHasher {
    pub fn new(pepper: impl Into<String>, config: HasherConfig) -> Self {
        Self {
            pepper: pepper.into(),
            config,
        }
    }

    /// Hash a plaintext password, producing a PHC-format digest string.
    ///
    /// The salt is generated fresh per call, so hashing the same password
    /// twice yields different digests.
    pub fn hash(&self, plaintext: &str) -> Result<String, Error> {
        use argon2::PasswordHasher as _;

        let salt = SaltString::generate(&mut OsRng);
        let peppered = self.pepper_input(plaintext);
        let digest = self
            .argon2()?
            .hash_password(peppered.as_bytes(), &salt)
            .map_err(|e| CryptoError::PasswordHash(e.to_string()))?;

        Ok(digest.to_string())
    }

    /// Verify a plaintext password against a stored digest.
    ///
    /// Returns `false` rather than an error for malformed digests, so a
    /// corrupted record behaves like a wrong password. Comparison timing is
    /// handled by the underlying primitive.
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        use argon2::PasswordVerifier as _;

        let parsed = match PasswordHash::new(digest) {
            Ok(parsed) => parsed,
            Err(_) => return false,
        };

        let peppered = self.pepper_input(plaintext);
        Argon2::default()
            .verify_password(peppered.as_bytes(), &parsed)
            .is_ok()
    }

    fn pepper_input(&self, plaintext: &str) -> String {
        format!("{}{}", plaintext, self.pepper)
    }

    fn argon2(&self) -> Result<Argon2<'static>, Error> {
        let params = Params::new(
            self.config.memory_kib,
            self.config.iterations,
            self.config.parallelism,
            Some(32),
        )
        .map_err(|e| CryptoError::PasswordHash(e.to_string()))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}
