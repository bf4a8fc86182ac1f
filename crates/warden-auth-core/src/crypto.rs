//! Signing secrets and token fingerprints

use jsonwebtoken::{DecodingKey, EncodingKey};
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Pre-validated HS256 secret with its encoding and decoding keys.
///
/// Building `jsonwebtoken` keys from raw bytes on every call is wasted
/// work, so both are derived once here and shared by cloning.
#[derive(Clone)]
pub struct SigningSecret {
    inner: Arc<SecretKeys>,
}

struct SecretKeys {
    len: usize,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningSecret {
    /// Minimum allowed secret length in bytes (256 bits)
    pub const MIN_KEY_LENGTH: usize = 32;

    /// Create a signing secret from bytes.
    ///
    /// # Errors
    /// Returns error if the secret is shorter than 32 bytes.
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, SecretError> {
        let bytes = secret.as_ref();
        if bytes.len() < Self::MIN_KEY_LENGTH {
            return Err(SecretError::TooShort {
                actual: bytes.len(),
                minimum: Self::MIN_KEY_LENGTH,
            });
        }
        Ok(Self {
            inner: Arc::new(SecretKeys {
                len: bytes.len(),
                encoding: EncodingKey::from_secret(bytes),
                decoding: DecodingKey::from_secret(bytes),
            }),
        })
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.inner.encoding
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.inner.decoding
    }
}

impl std::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningSecret")
            .field("key_length", &self.inner.len)
            .finish_non_exhaustive()
    }
}

/// Errors that can occur when creating a signing secret
#[derive(Debug, Clone, thiserror::Error)]
pub enum SecretError {
    #[error("signing secret too short: got {actual} bytes, need at least {minimum}")]
    TooShort { actual: usize, minimum: usize },
}

/// Deterministic, non-reversible fingerprint of a token.
///
/// Only fingerprints are ever written to the revocation store.
pub fn fingerprint(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
