//! Configuration for the Auth API service.

use std::time::Duration;

use warden_auth_core::AuthConfig;

/// Auth API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,

    /// Database URL
    pub database_url: String,

    /// Redis URL; the in-memory revocation store is used when unset
    pub redis_url: Option<String>,

    /// Auth core configuration
    pub auth: AuthConfig,

    /// Per-request timeout applied to API routes
    pub request_timeout: Duration,

    /// Metrics enabled
    pub metrics_enabled: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let redis_url = lookup("REDIS_URL").filter(|url| !url.trim().is_empty());

        let http_port = parse_or(&lookup, "HTTP_PORT", 8080u16)?;

        let secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let issuer = lookup("JWT_ISSUER").unwrap_or_else(|| "warden".to_string());

        let access_minutes: u64 = parse_or(&lookup, "ACCESS_TOKEN_EXP", 15)?;
        let refresh_minutes: u64 = parse_or(&lookup, "REFRESH_TOKEN_EXP", 10_080)?;
        let leeway_secs: u64 = parse_or(&lookup, "TOKEN_LEEWAY_SECS", 0)?;
        let request_timeout_secs: u64 = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?;

        let metrics_enabled = lookup("METRICS_ENABLED")
            .and_then(|v| v.parse().ok())
            .unwrap_or(true);

        let mut auth = AuthConfig::try_new(issuer, secret.as_bytes())
            .map_err(|e| ConfigError::AuthConfig(e.to_string()))?
            .with_lifetimes(
                Duration::from_secs(access_minutes.saturating_mul(60)),
                Duration::from_secs(refresh_minutes.saturating_mul(60)),
            )
            .map_err(|e| ConfigError::AuthConfig(e.to_string()))?
            .with_leeway(Duration::from_secs(leeway_secs));

        if let Some(refresh_secret) = lookup("JWT_REFRESH_SECRET") {
            auth = auth
                .with_refresh_secret(refresh_secret.as_bytes())
                .map_err(|e| ConfigError::AuthConfig(e.to_string()))?;
        }

        Ok(Self {
            http_port,
            database_url,
            redis_url,
            auth,
            request_timeout: Duration::from_secs(request_timeout_secs),
            metrics_enabled,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Auth config error: {0}")]
    AuthConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "config-test-secret-0123456789abcdefgh";

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/warden"), ("JWT_SECRET", SECRET)])
            .unwrap();

        assert_eq!(config.http_port, 8080);
        assert!(config.redis_url.is_none());
        assert_eq!(config.auth.issuer, "warden");
        assert_eq!(config.auth.access_ttl, Duration::from_secs(15 * 60));
        assert_eq!(config.auth.refresh_ttl, Duration::from_secs(7 * 24 * 60 * 60));
        assert_eq!(config.auth.leeway, Duration::ZERO);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.metrics_enabled);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/warden"),
            ("REDIS_URL", "redis://localhost:6379"),
            ("JWT_SECRET", SECRET),
            ("JWT_REFRESH_SECRET", "another-refresh-secret-0123456789abcd"),
            ("JWT_ISSUER", "auth.example.com"),
            ("ACCESS_TOKEN_EXP", "5"),
            ("REFRESH_TOKEN_EXP", "60"),
            ("TOKEN_LEEWAY_SECS", "2"),
            ("HTTP_PORT", "9000"),
        ])
        .unwrap();

        assert_eq!(config.http_port, 9000);
        assert_eq!(config.redis_url.as_deref(), Some("redis://localhost:6379"));
        assert_eq!(config.auth.issuer, "auth.example.com");
        assert!(config.auth.refresh_secret.is_some());
        assert_eq!(config.auth.access_ttl, Duration::from_secs(300));
        assert_eq!(config.auth.refresh_ttl, Duration::from_secs(3600));
        assert_eq!(config.auth.leeway, Duration::from_secs(2));
    }

    #[test]
    fn test_missing_required() {
        assert!(matches!(
            load(&[("JWT_SECRET", SECRET)]),
            Err(ConfigError::Missing("DATABASE_URL"))
        ));
        assert!(matches!(
            load(&[("DATABASE_URL", "postgres://localhost/warden")]),
            Err(ConfigError::Missing("JWT_SECRET"))
        ));
    }

    #[test]
    fn test_rejects_bad_values() {
        let base = [("DATABASE_URL", "postgres://localhost/warden"), ("JWT_SECRET", SECRET)];

        let mut short = base;
        short[1] = ("JWT_SECRET", "short");
        assert!(matches!(load(&short), Err(ConfigError::AuthConfig(_))));

        let mut pairs = base.to_vec();
        pairs.push(("HTTP_PORT", "not-a-port"));
        assert!(matches!(load(&pairs), Err(ConfigError::Invalid("HTTP_PORT"))));

        let mut pairs = base.to_vec();
        pairs.push(("ACCESS_TOKEN_EXP", "0"));
        assert!(matches!(load(&pairs), Err(ConfigError::AuthConfig(_))));

        let mut pairs = base.to_vec();
        pairs.push(("REFRESH_TOKEN_EXP", "153722867280912930"));
        assert!(matches!(load(&pairs), Err(ConfigError::AuthConfig(_))));
    }
}
