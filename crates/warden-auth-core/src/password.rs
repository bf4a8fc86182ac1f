//! Password hashing with Argon2id
//!
//! Hashes are stored as PHC strings, so the algorithm, parameters and salt
//! travel with the hash and verification needs nothing else.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;

/// Longest plaintext accepted for hashing, in bytes
pub const MAX_PASSWORD_BYTES: usize = 1024;

/// Hashing errors
#[derive(Debug, Error)]
pub enum HasherError {
    #[error("password exceeds {max} bytes")]
    TooLong { max: usize },

    #[error("hashing failed: {0}")]
    Hash(String),
}

/// Salted one-way password hasher with a fixed work factor
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    /// Hasher with the default Argon2id parameters (19 MiB, 2 passes, 1 lane)
    pub fn new() -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::DEFAULT),
        }
    }

    /// Hasher with explicit cost parameters
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, HasherError> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| HasherError::Hash(e.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a plaintext password into a PHC string
    pub fn hash(&self, plaintext: &str) -> Result<String, HasherError> {
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return Err(HasherError::TooLong {
                max: MAX_PASSWORD_BYTES,
            });
        }

        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| HasherError::Hash(e.to_string()))
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// A mismatch is `false`, not an error. An unparseable stored hash is
    /// also `false`.
    pub fn verify(&self, plaintext: &str, stored_hash: &str) -> bool {
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return false;
        }

        let parsed = match PasswordHash::new(stored_hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::error!(error = %e, "Stored password hash is not a valid PHC string");
                return false;
            }
        };

        self.argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher").finish_non_exhaustive()
    }
}
