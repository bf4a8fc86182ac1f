//! Session token types

use serde::{Deserialize, Serialize};

use crate::ParseError;

/// Token class, carried as a signed claim
///
/// Access and refresh tokens are structurally identical; the class claim is
/// the only thing that tells them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenClass {
    /// Short-lived bearer credential, verified statelessly
    Access,
    /// Longer-lived credential, redeemable once for a new pair
    Refresh,
}

impl TokenClass {
    /// Class name as it appears in token claims
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl std::fmt::Display for TokenClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TokenClass {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" => Ok(Self::Access),
            "refresh" => Ok(Self::Refresh),
            other => Err(ParseError::InvalidTokenClass(other.to_string())),
        }
    }
}

/// Token pair returned after authentication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access token (short-lived)
    pub access_token: String,
    /// Refresh token (long-lived, single use)
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
    /// Token type (always "Bearer")
    pub token_type: String,
}

impl TokenPair {
    /// Create a bearer token pair
    pub fn bearer(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_in: u64,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_in,
            token_type: "Bearer".to_string(),
        }
    }
}
