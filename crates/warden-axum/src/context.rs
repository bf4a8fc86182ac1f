//! Authenticated principal attached to each request.
//!
//! The [`AuthenticatedPrincipal`] lives in request extensions for the
//! lifetime of one request and is never cached across requests.

use warden_auth_core::TokenClaims;
use warden_types::{Role, UserId};

use crate::error::GateError;

/// Subject and role resolved from a verified access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedPrincipal {
    /// The authenticated user's ID.
    pub user_id: UserId,
    /// Role carried in the token.
    pub role: Role,
    /// Token expiry, seconds since the Unix epoch.
    pub expires_at: i64,
}

impl AuthenticatedPrincipal {
    /// Create a principal directly.
    #[must_use]
    pub fn new(user_id: UserId, role: Role, expires_at: i64) -> Self {
        Self {
            user_id,
            role,
            expires_at,
        }
    }
}

impl From<&TokenClaims> for AuthenticatedPrincipal {
    fn from(claims: &TokenClaims) -> Self {
        Self::new(claims.sub, claims.role, claims.exp)
    }
}

/// Check the principal's role against an allow-set.
///
/// An empty allow-set admits nobody.
pub fn authorize(principal: &AuthenticatedPrincipal, allowed: &[Role]) -> Result<(), GateError> {
    if allowed.contains(&principal.role) {
        Ok(())
    } else {
        Err(GateError::Forbidden)
    }
}
