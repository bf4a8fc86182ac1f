//! Warden Types - Shared domain types
//!
//! This crate contains domain types used across Warden crates:
//! - User identity and roles
//! - Token classes and issued token pairs
//! - Audit action tags

pub mod auth;
pub mod error;
pub mod session;
pub mod user;

pub use auth::*;
pub use error::*;
pub use session::*;
pub use user::*;
