//! Common error types

use thiserror::Error;

/// Errors raised when parsing domain types from their string form
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Unknown role name
    #[error("invalid role: {0}")]
    InvalidRole(String),

    /// Unknown token class
    #[error("invalid token class: {0}")]
    InvalidTokenClass(String),
}
