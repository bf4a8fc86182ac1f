//! Warden Auth Core - session lifecycle business logic
//!
//! Credential hashing, signed token issuance and verification, refresh token
//! revocation, and the orchestrator that ties them to the repositories.

pub mod clock;
pub mod config;
pub mod crypto;
pub mod error;
pub mod password;
pub mod revocation;
pub mod session;
pub mod token;

pub use clock::*;
pub use config::*;
pub use crypto::*;
pub use error::*;
pub use password::*;
pub use revocation::*;
pub use session::*;
pub use token::*;
