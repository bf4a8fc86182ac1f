//! HS256 token issuance and verification
//!
//! The header is inspected before any signature work so that a token
//! announcing a different algorithm (including `none`) is rejected outright.
//! Expiry is checked by hand against an injectable [`Clock`], which keeps the
//! boundary exact and testable.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;
use warden_types::{Role, TokenClass, UserId};

use crate::clock::{Clock, SystemClock};
use crate::crypto::SigningSecret;
use crate::AuthConfig;

/// Verification failures, one per cause
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("signature mismatch")]
    BadSignature,

    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("token expired")]
    Expired,

    #[error("malformed token: {0}")]
    Malformed(String),

    /// Issuance failed (never produced by verification)
    #[error("signing failed: {0}")]
    Signing(String),
}

/// Signed claims carried by every token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub iss: String,
    pub sub: UserId,
    pub role: Role,
    pub class: TokenClass,
    pub iat: i64,
    pub exp: i64,
    pub jti: Uuid,
}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

#[derive(Deserialize)]
struct RawClass {
    class: Option<String>,
}

/// Builds and checks signed tokens
#[derive(Clone)]
pub struct TokenCodec {
    issuer: String,
    access_key: SigningSecret,
    refresh_key: Option<SigningSecret>,
    leeway: i64,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    /// Create a codec on the system clock
    pub fn new(config: &AuthConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a codec on an explicit clock
    pub fn with_clock(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            issuer: config.issuer.clone(),
            access_key: config.access_secret.clone(),
            refresh_key: config.refresh_secret.clone(),
            leeway: i64::try_from(config.leeway.as_secs()).unwrap_or(i64::MAX),
            clock,
        }
    }

    fn key_for(&self, class: TokenClass) -> &SigningSecret {
        match (class, &self.refresh_key) {
            (TokenClass::Refresh, Some(key)) => key,
            _ => &self.access_key,
        }
    }

    /// Issue a signed token for `subject`
    pub fn issue(
        &self,
        subject: UserId,
        role: Role,
        class: TokenClass,
        lifetime: Duration,
    ) -> Result<String, TokenError> {
        let iat = self.clock.now();
        let lifetime = i64::try_from(lifetime.as_secs())
            .map_err(|_| TokenError::Signing("lifetime out of range".to_string()))?;

        let claims = TokenClaims {
            iss: self.issuer.clone(),
            sub: subject,
            role,
            class,
            iat,
            exp: iat.saturating_add(lifetime),
            jti: Uuid::new_v4(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            self.key_for(class).encoding_key(),
        )
        .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify a token and return its claims.
    ///
    /// Never touches the revocation store.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(payload_b64), Some(_), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed("expected three segments".to_string()));
        };

        let header: RawHeader = decode_segment(header_b64)?;
        if header.alg != "HS256" {
            return Err(TokenError::UnsupportedAlgorithm(header.alg));
        }

        // Key selection needs the claimed class before the signature is checked
        let claimed: RawClass = decode_segment(payload_b64)?;
        let key = match claimed.class.as_deref() {
            Some("refresh") => self.key_for(TokenClass::Refresh),
            _ => self.key_for(TokenClass::Access),
        };

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let data = decode::<TokenClaims>(token, key.decoding_key(), &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                ErrorKind::InvalidAlgorithm => {
                    TokenError::UnsupportedAlgorithm(header.alg.clone())
                }
                _ => TokenError::Malformed(e.to_string()),
            }
        })?;

        let claims = data.claims;
        if self.clock.now() >= claims.exp.saturating_add(self.leeway) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("issuer", &self.issuer)
            .field("split_keys", &self.refresh_key.is_some())
            .field("leeway", &self.leeway)
            .finish_non_exhaustive()
    }
}

fn decode_segment<T: serde::de::DeserializeOwned>(segment: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| TokenError::Malformed(format!("base64: {e}")))?;
    serde_json::from_slice(&bytes).map_err(|e| TokenError::Malformed(format!("json: {e}")))
}
