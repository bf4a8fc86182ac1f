//! Repository traits
//!
//! Define async repository interfaces for database operations.

use async_trait::async_trait;
use uuid::Uuid;
use warden_types::{AuditAction, Role};

use crate::error::DbResult;
use crate::models::*;

/// Identity repository trait
///
/// Emails are expected to be normalised by the caller. Soft-deleted
/// identities are invisible to every lookup.
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// Find an identity by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<IdentityRow>>;

    /// Find an identity by email
    async fn find_by_email(&self, email: &str) -> DbResult<Option<IdentityRow>>;

    /// Create a new identity, failing with `DbError::Conflict` if the email is taken
    async fn create(&self, identity: CreateIdentity) -> DbResult<IdentityRow>;

    /// Record a successful login
    async fn update_last_login(&self, id: Uuid) -> DbResult<()>;

    /// Soft-delete an identity, freeing its email for a new registration
    async fn discard(&self, id: Uuid) -> DbResult<()>;
}

/// Create identity input
#[derive(Debug, Clone)]
pub struct CreateIdentity {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
}

/// Profile repository trait
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Find a profile by identity ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<ProfileRow>>;

    /// Find a profile by the owning identity's email
    async fn find_by_email(&self, email: &str) -> DbResult<Option<ProfileRow>>;

    /// Create a profile for an existing identity
    async fn create(&self, profile: CreateProfile) -> DbResult<ProfileRow>;
}

/// Create profile input
#[derive(Debug, Clone)]
pub struct CreateProfile {
    pub id: Uuid,
    pub display_name: String,
    pub role: Role,
    pub phone_number: Option<String>,
}

/// Audit repository trait (append-only)
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Append an audit entry
    async fn append(&self, entry: CreateAuditEntry) -> DbResult<AuditRow>;

    /// List the most recent entries for an actor, newest first
    async fn list_for_actor(&self, actor_id: Uuid, limit: i64) -> DbResult<Vec<AuditRow>>;
}

/// Create audit entry input
#[derive(Debug, Clone)]
pub struct CreateAuditEntry {
    pub actor_id: Uuid,
    pub action: AuditAction,
    pub details: serde_json::Value,
}
