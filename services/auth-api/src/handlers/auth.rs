//! Session handlers (signup, login, logout, refresh, me)

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use warden_auth_core::{SignupInput, SignupOutcome, UserSummary};
use warden_axum::RequireAuth;
use warden_types::TokenPair;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub revoked_refresh_tokens: u64,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/auth/signup
///
/// Register an identity and return its first token pair
pub async fn signup(
    State(state): State<AppState>,
    body: Result<Json<SignupInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SignupOutcome>)> {
    let Json(input) = body?;
    let outcome = state.sessions.signup(input).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<TokenPair>> {
    let Json(req) = body?;
    let tokens = state.sessions.login(&req.email, &req.password).await?;
    Ok(Json(tokens))
}

/// POST /api/v1/auth/logout
///
/// Revoke every refresh token of the caller
pub async fn logout(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> ApiResult<Json<LogoutResponse>> {
    let revoked = state.sessions.logout(auth.user_id).await?;
    Ok(Json(LogoutResponse {
        success: true,
        revoked_refresh_tokens: revoked,
    }))
}

/// POST /api/v1/auth/refresh
///
/// Rotate a refresh token into a new pair
pub async fn refresh(
    State(state): State<AppState>,
    body: Result<Json<RefreshRequest>, JsonRejection>,
) -> ApiResult<Json<TokenPair>> {
    let Json(req) = body?;
    if req.refresh_token.trim().is_empty() {
        return Err(ApiError::BadRequest("refresh_token is required".to_string()));
    }
    let tokens = state.sessions.refresh_token(req.refresh_token.trim()).await?;
    Ok(Json(tokens))
}

/// GET /api/v1/auth/me
pub async fn me(State(state): State<AppState>, auth: RequireAuth) -> ApiResult<Json<UserSummary>> {
    let user = state.sessions.me(auth.user_id).await?;
    Ok(Json(user))
}
