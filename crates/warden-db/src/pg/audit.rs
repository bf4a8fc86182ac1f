//! PostgreSQL audit log repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::AuditRow;
use crate::repo::{AuditRepository, CreateAuditEntry};

/// PostgreSQL audit repository
#[derive(Clone)]
pub struct PgAuditRepository {
    pool: PgPool,
}

impl PgAuditRepository {
    /// Create a new audit repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditRepository for PgAuditRepository {
    async fn append(&self, entry: CreateAuditEntry) -> DbResult<AuditRow> {
        let row = sqlx::query_as::<_, AuditRow>(
            r#"
            INSERT INTO audit_log (actor_id, action, details)
            VALUES ($1, $2, $3)
            RETURNING id, actor_id, action, details, created_at
            "#,
        )
        .bind(entry.actor_id)
        .bind(entry.action.as_str())
        .bind(&entry.details)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_for_actor(&self, actor_id: Uuid, limit: i64) -> DbResult<Vec<AuditRow>> {
        let rows = sqlx::query_as::<_, AuditRow>(
            r#"
            SELECT id, actor_id, action, details, created_at
            FROM audit_log
            WHERE actor_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(actor_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
