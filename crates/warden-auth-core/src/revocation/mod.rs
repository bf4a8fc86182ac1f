//! Refresh token liveness
//!
//! A refresh token may be redeemed only while its fingerprint has a live
//! entry. Entries expire on their own once the token's lifetime has passed.

mod memory;
mod redis;

pub use self::memory::MemoryRevocationStore;
pub use self::redis::RedisRevocationStore;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use warden_types::UserId;

/// Revocation store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store connection failed: {0}")]
    Connection(String),

    #[error("store command failed: {0}")]
    Command(String),
}

/// Expiring fingerprint store shared by every orchestrator instance
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Register a fingerprint as live for `ttl`
    async fn mark_live(&self, fingerprint: &str, subject: UserId, ttl: Duration) -> Result<(), StoreError>;

    /// Whether the fingerprint is currently live
    async fn is_live(&self, fingerprint: &str) -> Result<bool, StoreError>;

    /// Retire a fingerprint (idempotent)
    async fn revoke(&self, fingerprint: &str) -> Result<(), StoreError>;

    /// Atomically retire a fingerprint, returning whether it was live.
    ///
    /// Of any number of concurrent calls for the same fingerprint, at most
    /// one returns `true`.
    async fn consume(&self, fingerprint: &str) -> Result<bool, StoreError>;

    /// Retire every live fingerprint owned by `subject`, returning how many
    async fn revoke_all_for_subject(&self, subject: UserId) -> Result<u64, StoreError>;

    /// Backend name for logs and health output
    fn backend(&self) -> &'static str;
}
