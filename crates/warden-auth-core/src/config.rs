//! Configuration types for the session orchestrator

use std::time::Duration;

use crate::crypto::SigningSecret;
use crate::AuthError;

/// Default access token lifetime (15 minutes)
pub const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(15 * 60);
/// Default refresh token lifetime (7 days)
pub const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);
/// Longest lifetime either token class may be given (365 days)
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Immutable auth configuration, built once at startup
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// `iss` claim written into and required on every token
    pub issuer: String,
    /// Secret for access tokens, and for refresh tokens when no refresh secret is set
    pub access_secret: SigningSecret,
    /// Optional distinct secret for refresh tokens
    pub refresh_secret: Option<SigningSecret>,
    /// Access token lifetime
    pub access_ttl: Duration,
    /// Refresh token lifetime
    pub refresh_ttl: Duration,
    /// Tolerance added to `exp` before a token counts as expired
    pub leeway: Duration,
}

impl AuthConfig {
    /// Create a config with default lifetimes.
    ///
    /// # Errors
    /// Fails if the issuer is empty or the secret is shorter than 32 bytes.
    pub fn try_new(issuer: impl Into<String>, secret: impl AsRef<[u8]>) -> Result<Self, AuthError> {
        let issuer = issuer.into();
        if issuer.trim().is_empty() {
            return Err(AuthError::Configuration("issuer must not be empty".to_string()));
        }

        let access_secret = SigningSecret::new(secret)
            .map_err(|e| AuthError::Configuration(format!("JWT secret: {e}")))?;

        Ok(Self {
            issuer,
            access_secret,
            refresh_secret: None,
            access_ttl: DEFAULT_ACCESS_TTL,
            refresh_ttl: DEFAULT_REFRESH_TTL,
            leeway: Duration::ZERO,
        })
    }

    /// Sign refresh tokens with their own secret
    pub fn with_refresh_secret(mut self, secret: impl AsRef<[u8]>) -> Result<Self, AuthError> {
        let secret = SigningSecret::new(secret)
            .map_err(|e| AuthError::Configuration(format!("JWT refresh secret: {e}")))?;
        self.refresh_secret = Some(secret);
        Ok(self)
    }

    /// Set token lifetimes (each between one second and [`MAX_TOKEN_TTL`])
    pub fn with_lifetimes(mut self, access: Duration, refresh: Duration) -> Result<Self, AuthError> {
        if access.as_secs() == 0 || refresh.as_secs() == 0 {
            return Err(AuthError::Configuration(
                "token lifetimes must be at least one second".to_string(),
            ));
        }
        if access > MAX_TOKEN_TTL || refresh > MAX_TOKEN_TTL {
            return Err(AuthError::Configuration(format!(
                "token lifetimes must not exceed {} days",
                MAX_TOKEN_TTL.as_secs() / 86_400
            )));
        }
        self.access_ttl = access;
        self.refresh_ttl = refresh;
        Ok(self)
    }

    /// Set expiry leeway
    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_defaults() {
        let config = AuthConfig::try_new("warden", SECRET).unwrap();
        assert_eq!(config.access_ttl, Duration::from_secs(900));
        assert_eq!(config.refresh_ttl, Duration::from_secs(604_800));
        assert_eq!(config.leeway, Duration::ZERO);
        assert!(config.refresh_secret.is_none());
    }

    #[test]
    fn test_rejects_short_secrets() {
        assert!(matches!(
            AuthConfig::try_new("warden", "short"),
            Err(AuthError::Configuration(_))
        ));
        let config = AuthConfig::try_new("warden", SECRET).unwrap();
        assert!(config.with_refresh_secret("also-short").is_err());
    }

    #[test]
    fn test_rejects_empty_issuer() {
        assert!(AuthConfig::try_new("  ", SECRET).is_err());
    }

    #[test]
    fn test_rejects_zero_lifetimes() {
        let config = AuthConfig::try_new("warden", SECRET).unwrap();
        assert!(config
            .clone()
            .with_lifetimes(Duration::ZERO, Duration::from_secs(60))
            .is_err());
        assert!(config
            .clone()
            .with_lifetimes(Duration::from_millis(500), Duration::from_secs(60))
            .is_err());
        let config = config
            .with_lifetimes(Duration::from_secs(60), Duration::from_secs(3600))
            .unwrap();
        assert_eq!(config.access_ttl, Duration::from_secs(60));
    }

    #[test]
    fn test_rejects_oversized_lifetimes() {
        let config = AuthConfig::try_new("warden", SECRET).unwrap();
        let huge = Duration::from_secs(153_722_867_280_912_930u64.saturating_mul(60));
        assert!(matches!(
            config.clone().with_lifetimes(Duration::from_secs(900), huge),
            Err(AuthError::Configuration(_))
        ));
        assert!(config
            .clone()
            .with_lifetimes(MAX_TOKEN_TTL + Duration::from_secs(1), Duration::from_secs(3600))
            .is_err());
        let config = config
            .with_lifetimes(Duration::from_secs(900), MAX_TOKEN_TTL)
            .unwrap();
        assert_eq!(config.refresh_ttl, MAX_TOKEN_TTL);
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let config = AuthConfig::try_new("warden", SECRET).unwrap();
        assert!(!format!("{config:?}").contains(SECRET));
    }
}
