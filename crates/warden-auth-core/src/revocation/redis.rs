//! Redis-backed revocation store
//!
//! Layout:
//! - `{prefix}:rt:{fingerprint}` holds the owning subject, with a PX expiry
//! - `{prefix}:subject:{user_id}` is a set of that subject's fingerprints

use ::redis::AsyncCommands;
use async_trait::async_trait;
use deadpool_redis::{Config, Connection, Pool, Runtime};
use std::time::Duration;
use warden_types::UserId;

use super::{RevocationStore, StoreError};

/// Revocation store shared across service instances through Redis
#[derive(Clone)]
pub struct RedisRevocationStore {
    pool: Pool,
    prefix: String,
}

impl RedisRevocationStore {
    /// Default key prefix
    pub const DEFAULT_PREFIX: &'static str = "warden";

    /// Build a store from a `redis://` URL
    pub fn from_url(url: &str) -> Result<Self, StoreError> {
        let pool = Config::from_url(url)
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(Self::new(pool))
    }

    /// Wrap an existing pool
    pub fn new(pool: Pool) -> Self {
        Self {
            pool,
            prefix: Self::DEFAULT_PREFIX.to_string(),
        }
    }

    /// Use a different key prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Round-trip a PING, for readiness checks
    pub async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;
        let _pong: String = ::redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(command_error)?;
        Ok(())
    }

    fn token_key(&self, fingerprint: &str) -> String {
        format!("{}:rt:{}", self.prefix, fingerprint)
    }

    fn subject_key(&self, subject: UserId) -> String {
        format!("{}:subject:{}", self.prefix, subject)
    }

    async fn conn(&self) -> Result<Connection, StoreError> {
        self.pool.get().await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to get Redis connection");
            StoreError::Connection(e.to_string())
        })
    }
}

fn command_error(err: ::redis::RedisError) -> StoreError {
    StoreError::Command(err.to_string())
}

fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn mark_live(&self, fingerprint: &str, subject: UserId, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;
        let token_key = self.token_key(fingerprint);
        let subject_key = self.subject_key(subject);
        let px = ttl_millis(ttl);

        let () = ::redis::pipe()
            .atomic()
            .cmd("SET")
            .arg(&token_key)
            .arg(subject.to_string())
            .arg("PX")
            .arg(px)
            .ignore()
            .sadd(&subject_key, fingerprint)
            .ignore()
            .cmd("PEXPIRE")
            .arg(&subject_key)
            .arg(px)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(command_error)?;
        Ok(())
    }

    async fn is_live(&self, fingerprint: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn().await?;
        conn.exists(self.token_key(fingerprint))
            .await
            .map_err(command_error)
    }

    async fn revoke(&self, fingerprint: &str) -> Result<(), StoreError> {
        self.consume(fingerprint).await.map(|_| ())
    }

    async fn consume(&self, fingerprint: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn().await?;
        let owner: Option<String> = ::redis::cmd("GETDEL")
            .arg(self.token_key(fingerprint))
            .query_async(&mut conn)
            .await
            .map_err(command_error)?;

        let Some(owner) = owner else {
            return Ok(false);
        };

        match UserId::parse(&owner) {
            Ok(subject) => {
                let cleaned: Result<u64, _> = conn.srem(self.subject_key(subject), fingerprint).await;
                if let Err(e) = cleaned {
                    tracing::warn!(user_id = %subject, error = %e, "Failed to drop fingerprint from subject index");
                }
            }
            Err(e) => {
                tracing::warn!(owner = %owner, error = %e, "Refresh token entry has an unparseable owner");
            }
        }
        Ok(true)
    }

    async fn revoke_all_for_subject(&self, subject: UserId) -> Result<u64, StoreError> {
        let mut conn = self.conn().await?;
        let subject_key = self.subject_key(subject);

        let (fingerprints, _): (Vec<String>, i64) = ::redis::pipe()
            .atomic()
            .smembers(&subject_key)
            .del(&subject_key)
            .query_async(&mut conn)
            .await
            .map_err(command_error)?;

        if fingerprints.is_empty() {
            return Ok(0);
        }

        let keys: Vec<String> = fingerprints.iter().map(|fp| self.token_key(fp)).collect();
        let removed: u64 = conn.del(keys).await.map_err(command_error)?;
        Ok(removed)
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

impl std::fmt::Debug for RedisRevocationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisRevocationStore")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}
