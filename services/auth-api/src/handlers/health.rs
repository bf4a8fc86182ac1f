//! Health check handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use std::time::Instant;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub checks: ReadyChecks,
}

#[derive(Debug, Serialize)]
pub struct ReadyChecks {
    pub database: CheckResult,
    pub revocation_store: CheckResult,
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub status: &'static str,
    pub backend: &'static str,
    pub latency_ms: u64,
}

impl CheckResult {
    fn from_outcome(ok: bool, backend: &'static str, start: Instant) -> Self {
        Self {
            status: if ok { "ok" } else { "error" },
            backend,
            latency_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        }
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// GET /health - Liveness probe (fast, no dependencies)
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "auth-api",
    })
}

/// GET /ready - Readiness probe (database and revocation store)
pub async fn ready(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadyResponse>) {
    let start = Instant::now();
    let db_ok = sqlx::query("SELECT 1").fetch_one(&*state.pool).await.is_ok();
    let database = CheckResult::from_outcome(db_ok, "postgres", start);

    let start = Instant::now();
    let store_ok = match &state.redis {
        Some(redis) => redis
            .ping()
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Redis readiness check failed"))
            .is_ok(),
        None => true,
    };
    let revocation_store =
        CheckResult::from_outcome(store_ok, state.sessions.store().backend(), start);

    let ready = database.is_ok() && revocation_store.is_ok();
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadyResponse {
            status: if ready { "ready" } else { "not_ready" },
            service: "auth-api",
            checks: ReadyChecks {
                database,
                revocation_store,
            },
        }),
    )
}
