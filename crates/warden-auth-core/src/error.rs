//! Auth errors

use thiserror::Error;

use crate::password::HasherError;
use crate::revocation::StoreError;
use crate::token::TokenError;

/// Session lifecycle errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Password and confirmation differ
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Request failed validation before reaching storage
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An identity already owns this email
    #[error("email already registered")]
    EmailAlreadyExists,

    /// No identity for the given email or id
    #[error("user not found")]
    UserNotFound,

    /// Password did not verify
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Token failed verification, has the wrong class, or has expired
    #[error("invalid token")]
    InvalidToken,

    /// Authenticated, but not allowed to act on the target
    #[error("insufficient permissions")]
    Forbidden,

    /// Refresh token is well-formed but no longer live
    #[error("token revoked")]
    TokenRevoked,

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// Revocation store unavailable
    #[error("revocation store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::PasswordMismatch | Self::InvalidInput(_) => 400,
            Self::UserNotFound
            | Self::InvalidCredentials
            | Self::InvalidToken
            | Self::TokenRevoked => 401,
            Self::Forbidden => 403,
            Self::EmailAlreadyExists => 409,
            Self::Store(_) => 503,
            Self::Database(_) | Self::Configuration(_) | Self::Internal(_) => 500,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::PasswordMismatch => "PASSWORD_MISMATCH",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenRevoked => "TOKEN_REVOKED",
            Self::Forbidden => "FORBIDDEN",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Store(_) => "STORE_UNAVAILABLE",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether this is a server-side fault rather than a caller mistake
    pub fn is_server_fault(&self) -> bool {
        self.status_code() >= 500
    }
}

impl From<warden_db::DbError> for AuthError {
    fn from(err: warden_db::DbError) -> Self {
        tracing::error!(error = %err, "Database error");
        Self::Database(err.to_string())
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        tracing::error!(error = %err, "Revocation store error");
        Self::Store(err.to_string())
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(msg) => {
                tracing::error!(error = %msg, "Failed to sign token");
                Self::Internal("failed to issue token".to_string())
            }
            other => {
                tracing::debug!(reason = %other, "Token rejected");
                Self::InvalidToken
            }
        }
    }
}

impl From<HasherError> for AuthError {
    fn from(err: HasherError) -> Self {
        match err {
            HasherError::TooLong { .. } => Self::InvalidInput(err.to_string()),
            HasherError::Hash(msg) => {
                tracing::error!(error = %msg, "Password hashing failed");
                Self::Internal("failed to hash password".to_string())
            }
        }
    }
}
