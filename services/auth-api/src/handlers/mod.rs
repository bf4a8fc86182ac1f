//! HTTP handlers

mod admin;
mod auth;
mod health;
mod users;

pub use admin::audit_trail;
pub use auth::{login, logout, me, refresh, signup};
pub use health::{health, ready};
pub use users::delete_account;
