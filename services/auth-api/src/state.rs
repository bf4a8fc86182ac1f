//! Application state

use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use warden_auth_core::{RedisRevocationStore, SessionOrchestrator};
use warden_db::pg::{PgAuditRepository, PgIdentityRepository, PgProfileRepository};
use warden_db::DbPool;

use crate::config::Config;

/// Orchestrator wired to the PostgreSQL repositories
pub type SessionsImpl =
    SessionOrchestrator<PgIdentityRepository, PgProfileRepository, PgAuditRepository>;

/// Shared database pool wrapper for health checks
#[derive(Clone)]
pub struct SharedPool(Arc<DbPool>);

impl Deref for SharedPool {
    type Target = DbPool;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Session lifecycle operations
    pub sessions: Arc<SessionsImpl>,
    /// Database connection pool (shared reference for health checks)
    pub pool: SharedPool,
    /// Redis handle for readiness checks, when Redis backs revocation
    pub redis: Option<RedisRevocationStore>,
    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        sessions: SessionsImpl,
        pool: DbPool,
        redis: Option<RedisRevocationStore>,
        config: Config,
    ) -> Self {
        Self {
            sessions: Arc::new(sessions),
            pool: SharedPool(Arc::new(pool)),
            redis,
            config: Arc::new(config),
        }
    }

    /// Get request timeout from config
    pub fn request_timeout(&self) -> Duration {
        self.config.request_timeout
    }
}
