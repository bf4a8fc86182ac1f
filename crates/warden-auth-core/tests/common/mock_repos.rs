//! Mock repositories for testing

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use warden_auth_core::{RevocationStore, StoreError};
use warden_db::{
    AuditRepository, AuditRow, CreateAuditEntry, CreateIdentity, CreateProfile, DbError, DbResult,
    IdentityRepository, IdentityRow, ProfileRepository, ProfileRow,
};
use warden_types::UserId;

fn unavailable() -> DbError {
    DbError::Sqlx(sqlx::Error::PoolTimedOut)
}

/// In-memory identity repository for testing
#[derive(Default, Clone)]
pub struct MockIdentityRepository {
    identities: Arc<DashMap<Uuid, IdentityRow>>,
    fail_lookups: Arc<AtomicBool>,
    fail_discard: Arc<AtomicBool>,
}

impl MockIdentityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `find_by_email` and `find_by_id` fail
    #[allow(dead_code)]
    pub fn fail_lookups(&self, fail: bool) {
        self.fail_lookups.store(fail, Ordering::SeqCst);
    }

    /// Make `discard` fail
    #[allow(dead_code)]
    pub fn fail_discard(&self, fail: bool) {
        self.fail_discard.store(fail, Ordering::SeqCst);
    }

    /// Raw row, including soft-deleted ones
    #[allow(dead_code)]
    pub fn get_raw(&self, id: Uuid) -> Option<IdentityRow> {
        self.identities.get(&id).map(|r| r.value().clone())
    }

    /// Raw row by email, including soft-deleted ones
    #[allow(dead_code)]
    pub fn find_by_email_raw(&self, email: &str) -> Option<IdentityRow> {
        self.identities
            .iter()
            .find(|r| r.email.eq_ignore_ascii_case(email))
            .map(|r| r.value().clone())
    }

    fn live_by_email(&self, email: &str) -> Option<IdentityRow> {
        self.identities
            .iter()
            .find(|r| r.deleted_at.is_none() && r.email.eq_ignore_ascii_case(email))
            .map(|r| r.value().clone())
    }
}

#[async_trait]
impl IdentityRepository for MockIdentityRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<IdentityRow>> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(self
            .identities
            .get(&id)
            .filter(|r| r.deleted_at.is_none())
            .map(|r| r.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<IdentityRow>> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(self.live_by_email(email))
    }

    async fn create(&self, identity: CreateIdentity) -> DbResult<IdentityRow> {
        if self.live_by_email(&identity.email).is_some() {
            return Err(DbError::Conflict("identity already exists".to_string()));
        }
        let row = IdentityRow {
            id: identity.id,
            email: identity.email,
            password_hash: identity.password_hash,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
            deleted_at: None,
        };
        self.identities.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_last_login(&self, id: Uuid) -> DbResult<()> {
        match self.identities.get_mut(&id) {
            Some(mut row) if row.deleted_at.is_none() => {
                row.last_login_at = Some(Utc::now());
                row.updated_at = Utc::now();
                Ok(())
            }
            _ => Err(DbError::NotFound),
        }
    }

    async fn discard(&self, id: Uuid) -> DbResult<()> {
        if self.fail_discard.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        if let Some(mut row) = self.identities.get_mut(&id) {
            row.deleted_at = Some(Utc::now());
        }
        Ok(())
    }
}

/// In-memory profile repository for testing
#[derive(Clone)]
pub struct MockProfileRepository {
    profiles: Arc<DashMap<Uuid, ProfileRow>>,
    identities: MockIdentityRepository,
    fail_create: Arc<AtomicBool>,
}

impl MockProfileRepository {
    /// Profiles resolve emails through the given identity repository
    pub fn new(identities: MockIdentityRepository) -> Self {
        Self {
            profiles: Arc::new(DashMap::new()),
            identities,
            fail_create: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make `create` fail
    #[allow(dead_code)]
    pub fn fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    /// Overwrite a stored role
    #[allow(dead_code)]
    pub fn set_role(&self, id: Uuid, role: &str) {
        if let Some(mut row) = self.profiles.get_mut(&id) {
            row.role = role.to_string();
        }
    }

    /// Drop a profile, leaving its identity behind
    #[allow(dead_code)]
    pub fn remove(&self, id: Uuid) {
        self.profiles.remove(&id);
    }
}

#[async_trait]
impl ProfileRepository for MockProfileRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<ProfileRow>> {
        Ok(self.profiles.get(&id).map(|r| r.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<ProfileRow>> {
        let Some(identity) = self.identities.find_by_email(email).await? else {
            return Ok(None);
        };
        self.find_by_id(identity.id).await
    }

    async fn create(&self, profile: CreateProfile) -> DbResult<ProfileRow> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        if self.profiles.contains_key(&profile.id) {
            return Err(DbError::Conflict("profile already exists".to_string()));
        }
        let row = ProfileRow {
            id: profile.id,
            display_name: profile.display_name,
            role: profile.role.as_str().to_string(),
            phone_number: profile.phone_number,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.profiles.insert(row.id, row.clone());
        Ok(row)
    }
}

/// In-memory append-only audit log for testing
#[derive(Default, Clone)]
pub struct MockAuditRepository {
    entries: Arc<DashMap<i64, AuditRow>>,
    next_id: Arc<AtomicI64>,
    fail_append: Arc<AtomicBool>,
}

impl MockAuditRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `append` fail
    #[allow(dead_code)]
    pub fn fail_append(&self, fail: bool) {
        self.fail_append.store(fail, Ordering::SeqCst);
    }

    /// Count entries with the given action tag for an actor
    #[allow(dead_code)]
    pub fn count(&self, actor_id: Uuid, action: &str) -> usize {
        self.entries
            .iter()
            .filter(|r| r.actor_id == actor_id && r.action == action)
            .count()
    }
}

#[async_trait]
impl AuditRepository for MockAuditRepository {
    async fn append(&self, entry: CreateAuditEntry) -> DbResult<AuditRow> {
        if self.fail_append.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let row = AuditRow {
            id,
            actor_id: entry.actor_id,
            action: entry.action.as_str().to_string(),
            details: entry.details,
            created_at: Utc::now(),
        };
        self.entries.insert(id, row.clone());
        Ok(row)
    }

    async fn list_for_actor(&self, actor_id: Uuid, limit: i64) -> DbResult<Vec<AuditRow>> {
        let mut rows: Vec<AuditRow> = self
            .entries
            .iter()
            .filter(|r| r.actor_id == actor_id)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }
}

/// Revocation store whose every call fails
#[derive(Debug, Default, Clone)]
pub struct FailingStore;

#[async_trait]
impl RevocationStore for FailingStore {
    async fn mark_live(&self, _: &str, _: UserId, _: Duration) -> Result<(), StoreError> {
        Err(StoreError::Connection("connection refused".to_string()))
    }

    async fn is_live(&self, _: &str) -> Result<bool, StoreError> {
        Err(StoreError::Connection("connection refused".to_string()))
    }

    async fn revoke(&self, _: &str) -> Result<(), StoreError> {
        Err(StoreError::Connection("connection refused".to_string()))
    }

    async fn consume(&self, _: &str) -> Result<bool, StoreError> {
        Err(StoreError::Connection("connection refused".to_string()))
    }

    async fn revoke_all_for_subject(&self, _: UserId) -> Result<u64, StoreError> {
        Err(StoreError::Connection("connection refused".to_string()))
    }

    fn backend(&self) -> &'static str {
        "failing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_types::{AuditAction, Role};

    #[tokio::test]
    async fn test_mock_identity_repo_soft_delete() {
        let repo = MockIdentityRepository::new();
        let id = Uuid::new_v4();
        repo.create(CreateIdentity {
            id,
            email: "test@example.com".to_string(),
            password_hash: "hash".to_string(),
        })
        .await
        .unwrap();

        assert!(repo.find_by_email("TEST@example.com").await.unwrap().is_some());
        assert!(matches!(
            repo.create(CreateIdentity {
                id: Uuid::new_v4(),
                email: "test@example.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .await,
            Err(DbError::Conflict(_))
        ));

        repo.discard(id).await.unwrap();
        assert!(repo.find_by_id(id).await.unwrap().is_none());
        assert!(repo.find_by_email("test@example.com").await.unwrap().is_none());
        assert!(repo.get_raw(id).unwrap().deleted_at.is_some());
    }

    #[tokio::test]
    async fn test_mock_profile_repo_by_email() {
        let identities = MockIdentityRepository::new();
        let profiles = MockProfileRepository::new(identities.clone());
        let id = Uuid::new_v4();
        identities
            .create(CreateIdentity {
                id,
                email: "p@example.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();
        profiles
            .create(CreateProfile {
                id,
                display_name: "p".to_string(),
                role: Role::Admin,
                phone_number: None,
            })
            .await
            .unwrap();

        let found = profiles.find_by_email("p@example.com").await.unwrap().unwrap();
        assert_eq!(found.role().unwrap(), Role::Admin);
    }

    #[tokio::test]
    async fn test_mock_audit_newest_first() {
        let repo = MockAuditRepository::new();
        let actor = Uuid::new_v4();
        for action in [AuditAction::UserRegister, AuditAction::LoginFailed, AuditAction::Logout] {
            repo.append(CreateAuditEntry {
                actor_id: actor,
                action,
                details: serde_json::json!({}),
            })
            .await
            .unwrap();
        }

        let rows = repo.list_for_actor(actor, 2).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].action, "logout");
        assert_eq!(rows[1].action, "login_failed");
    }
}
