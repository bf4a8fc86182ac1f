//! PostgreSQL profile repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::ProfileRow;
use crate::repo::{CreateProfile, ProfileRepository};

/// PostgreSQL profile repository
#[derive(Clone)]
pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    /// Create a new profile repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<ProfileRow>> {
        let profile = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, display_name, role, phone_number, created_at, updated_at
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<ProfileRow>> {
        let profile = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT p.id, p.display_name, p.role, p.phone_number, p.created_at, p.updated_at
            FROM profiles p
            JOIN identities i ON i.id = p.id
            WHERE lower(i.email) = lower($1) AND i.deleted_at IS NULL
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn create(&self, profile: CreateProfile) -> DbResult<ProfileRow> {
        sqlx::query_as::<_, ProfileRow>(
            r#"
            INSERT INTO profiles (id, display_name, role, phone_number)
            VALUES ($1, $2, $3, $4)
            RETURNING id, display_name, role, phone_number, created_at, updated_at
            "#,
        )
        .bind(profile.id)
        .bind(&profile.display_name)
        .bind(profile.role.as_str())
        .bind(&profile.phone_number)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DbError::from_insert(e, "profile"))
    }
}
