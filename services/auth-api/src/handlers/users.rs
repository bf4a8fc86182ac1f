//! Account handlers

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;
use warden_auth_core::AuthError;
use warden_axum::RequireAuth;
use warden_types::UserId;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DeleteAccountResponse {
    pub success: bool,
    pub revoked_refresh_tokens: u64,
}

/// DELETE /api/v1/users/{id}
///
/// Soft-delete an account. The owner or an admin may call it.
pub async fn delete_account(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(target): Path<Uuid>,
) -> ApiResult<Json<DeleteAccountResponse>> {
    let revoked = state
        .sessions
        .delete_account(auth.user_id, auth.role, UserId(target))
        .await
        .map_err(|e| match e {
            AuthError::UserNotFound => ApiError::NotFound,
            other => other.into(),
        })?;

    Ok(Json(DeleteAccountResponse {
        success: true,
        revoked_refresh_tokens: revoked,
    }))
}
