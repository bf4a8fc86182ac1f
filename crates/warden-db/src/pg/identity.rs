//! PostgreSQL identity repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::IdentityRow;
use crate::repo::{CreateIdentity, IdentityRepository};

/// PostgreSQL identity repository
#[derive(Clone)]
pub struct PgIdentityRepository {
    pool: PgPool,
}

impl PgIdentityRepository {
    /// Create a new identity repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityRepository for PgIdentityRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<IdentityRow>> {
        let identity = sqlx::query_as::<_, IdentityRow>(
            r#"
            SELECT id, email, password_hash, created_at, updated_at,
                   last_login_at, deleted_at
            FROM identities
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(identity)
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<IdentityRow>> {
        let identity = sqlx::query_as::<_, IdentityRow>(
            r#"
            SELECT id, email, password_hash, created_at, updated_at,
                   last_login_at, deleted_at
            FROM identities
            WHERE lower(email) = lower($1) AND deleted_at IS NULL
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(identity)
    }

    async fn create(&self, identity: CreateIdentity) -> DbResult<IdentityRow> {
        sqlx::query_as::<_, IdentityRow>(
            r#"
            INSERT INTO identities (id, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, created_at, updated_at,
                      last_login_at, deleted_at
            "#,
        )
        .bind(identity.id)
        .bind(&identity.email)
        .bind(&identity.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DbError::from_insert(e, "identity"))
    }

    async fn update_last_login(&self, id: Uuid) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE identities SET last_login_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    async fn discard(&self, id: Uuid) -> DbResult<()> {
        sqlx::query(
            "UPDATE identities SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
