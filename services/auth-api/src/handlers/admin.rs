//! Admin handlers

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use warden_db::AuditRow;
use warden_types::UserId;

use crate::error::ApiResult;
use crate::state::AppState;

const DEFAULT_AUDIT_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AuditEntry {
    pub id: i64,
    pub actor_id: UserId,
    pub action: String,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl From<AuditRow> for AuditEntry {
    fn from(row: AuditRow) -> Self {
        Self {
            id: row.id,
            actor_id: row.actor_id(),
            action: row.action,
            details: row.details,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuditResponse {
    pub entries: Vec<AuditEntry>,
}

/// GET /api/v1/admin/audit/{user_id}
///
/// Newest audit entries for one actor. Admin only; enforced by the router.
pub async fn audit_trail(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<AuditQuery>,
) -> ApiResult<Json<AuditResponse>> {
    let limit = query.limit.unwrap_or(DEFAULT_AUDIT_LIMIT);
    let rows = state.sessions.audit_trail(UserId(user_id), limit).await?;
    Ok(Json(AuditResponse {
        entries: rows.into_iter().map(AuditEntry::from).collect(),
    }))
}
