//! Warden Auth API
//!
//! Session lifecycle microservice.
//!
//! ## REST Endpoints
//!
//! - `POST /api/v1/auth/signup` - Register and receive a token pair
//! - `POST /api/v1/auth/login` - Exchange credentials for a token pair
//! - `POST /api/v1/auth/refresh` - Rotate a refresh token
//! - `POST /api/v1/auth/logout` - Revoke the caller's refresh tokens
//! - `GET /api/v1/auth/me` - Current user
//! - `DELETE /api/v1/users/{id}` - Soft-delete an account (owner or admin)
//! - `GET /api/v1/admin/audit/{user_id}` - Audit trail (admin)
//!
//! ## Health Endpoints
//!
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /metrics` - Prometheus metrics

mod config;
mod error;
mod handlers;
mod router;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use tokio::signal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use warden_auth_core::{
    MemoryRevocationStore, RedisRevocationStore, RevocationStore, SessionOrchestrator,
};
use warden_db::Repositories;

use crate::config::Config;
use crate::router::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("auth_api=debug".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Warden Auth API");

    let config = Config::from_env()?;
    tracing::info!(
        http_port = config.http_port,
        issuer = %config.auth.issuer,
        access_ttl_secs = config.auth.access_ttl.as_secs(),
        refresh_ttl_secs = config.auth.refresh_ttl.as_secs(),
        "Configuration loaded"
    );

    let metrics_handle = if config.metrics_enabled {
        Some(setup_metrics()?)
    } else {
        None
    };

    let pool = warden_db::create_pool(&config.database_url).await?;
    warden_db::run_migrations(&pool).await?;
    tracing::info!("Database pool created, migrations applied");

    let (store, redis): (Arc<dyn RevocationStore>, Option<RedisRevocationStore>) =
        match &config.redis_url {
            Some(url) => {
                let redis = RedisRevocationStore::from_url(url)?;
                if let Err(e) = redis.ping().await {
                    tracing::warn!(error = %e, "Redis not reachable yet");
                }
                let store: Arc<dyn RevocationStore> = Arc::new(redis.clone());
                (store, Some(redis))
            }
            None => {
                tracing::warn!("REDIS_URL unset, revocation state is local to this instance");
                let store: Arc<dyn RevocationStore> = Arc::new(MemoryRevocationStore::new());
                (store, None)
            }
        };
    tracing::info!(backend = store.backend(), "Revocation store ready");

    let repos = Repositories::new(pool.clone());
    let sessions = SessionOrchestrator::new(
        config.auth.clone(),
        Arc::new(repos.identities),
        Arc::new(repos.profiles),
        Arc::new(repos.audit),
        store,
    );

    let http_addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let state = AppState::new(sessions, pool, redis, config);
    let app = build_router(state, metrics_handle);

    tracing::info!("HTTP server listening on {}", http_addr);
    let listener = tokio::net::TcpListener::bind(http_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn setup_metrics() -> anyhow::Result<PrometheusHandle> {
    // Argon2 dominates login and signup latency
    let auth_latency_buckets = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("warden_password_hash_seconds".to_string()),
            auth_latency_buckets,
        )?
        .install_recorder()?;

    metrics::describe_counter!("warden_signups_total", "Total successful signups");
    metrics::describe_counter!("warden_logins_total", "Login attempts by outcome");
    metrics::describe_counter!("warden_refresh_total", "Refresh token redemptions by outcome");
    metrics::describe_counter!("warden_account_deletions_total", "Accounts soft-deleted");
    metrics::describe_histogram!(
        "warden_password_hash_seconds",
        "Time spent hashing or verifying a password"
    );

    Ok(handle)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
