//! Session lifecycle: signup, login, logout, refresh rotation, account deletion
//!
//! The orchestrator holds no per-request state. Everything durable lives in
//! the repositories and the revocation store, so any number of instances can
//! serve the same users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::OnceCell;
use warden_db::{
    AuditRepository, AuditRow, CreateAuditEntry, CreateIdentity, CreateProfile, DbError,
    IdentityRepository, IdentityRow, ProfileRepository, ProfileRow,
};
use warden_types::{AuditAction, Role, TokenClass, TokenPair, UserId};

use crate::clock::Clock;
use crate::crypto::fingerprint;
use crate::password::CredentialHasher;
use crate::revocation::RevocationStore;
use crate::token::TokenCodec;
use crate::{AuthConfig, AuthError};

/// Most audit entries returned by one listing
pub const MAX_AUDIT_PAGE: i64 = 500;

/// Signup request
#[derive(Clone, Deserialize)]
pub struct SignupInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl std::fmt::Debug for SignupInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupInput")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Identity joined with its profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl UserSummary {
    fn from_rows(identity: &IdentityRow, profile: &ProfileRow, role: Role) -> Self {
        Self {
            id: identity.user_id(),
            email: identity.email.clone(),
            display_name: profile.display_name.clone(),
            role,
            phone_number: profile.phone_number.clone(),
            created_at: identity.created_at,
            last_login_at: identity.last_login_at,
        }
    }
}

/// Result of a successful signup
#[derive(Debug, Clone, Serialize)]
pub struct SignupOutcome {
    pub user: UserSummary,
    pub tokens: TokenPair,
}

/// Canonical form used for every email lookup and insert
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Composes hasher, codec, repositories and revocation store
pub struct SessionOrchestrator<I, P, A>
where
    I: IdentityRepository,
    P: ProfileRepository,
    A: AuditRepository,
{
    config: AuthConfig,
    codec: TokenCodec,
    hasher: CredentialHasher,
    identities: Arc<I>,
    profiles: Arc<P>,
    audit: Arc<A>,
    store: Arc<dyn RevocationStore>,
    // Hash verified against on unknown-email logins so both paths cost the same
    decoy_hash: OnceCell<String>,
}

impl<I, P, A> SessionOrchestrator<I, P, A>
where
    I: IdentityRepository,
    P: ProfileRepository,
    A: AuditRepository,
{
    /// Create an orchestrator on the system clock with default hashing cost
    pub fn new(
        config: AuthConfig,
        identities: Arc<I>,
        profiles: Arc<P>,
        audit: Arc<A>,
        store: Arc<dyn RevocationStore>,
    ) -> Self {
        Self {
            codec: TokenCodec::new(&config),
            hasher: CredentialHasher::new(),
            config,
            identities,
            profiles,
            audit,
            store,
            decoy_hash: OnceCell::new(),
        }
    }

    /// Replace the clock used for issuing and verifying tokens
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.codec = TokenCodec::with_clock(&self.config, clock);
        self
    }

    /// Replace the password hasher
    pub fn with_hasher(mut self, hasher: CredentialHasher) -> Self {
        self.hasher = hasher;
        self.decoy_hash = OnceCell::new();
        self
    }

    /// Token codec, for stateless access token verification
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Revocation store in use
    pub fn store(&self) -> &Arc<dyn RevocationStore> {
        &self.store
    }

    /// Register a new identity and hand back its first token pair
    #[tracing::instrument(skip_all)]
    pub async fn signup(&self, input: SignupInput) -> Result<SignupOutcome, AuthError> {
        if input.password != input.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        let email = normalize_email(&input.email);
        let display_name = input.username.trim().to_string();
        validate_signup(&display_name, &email, &input.password)?;

        if self.identities.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = self.hash_password(input.password).await?;

        let identity = match self
            .identities
            .create(CreateIdentity {
                id: UserId::new().0,
                email: email.clone(),
                password_hash,
            })
            .await
        {
            Ok(identity) => identity,
            // Lost a race with a concurrent signup for the same email
            Err(DbError::Conflict(_)) => return Err(AuthError::EmailAlreadyExists),
            Err(e) => return Err(e.into()),
        };
        let user_id = identity.user_id();

        let profile = match self
            .profiles
            .create(CreateProfile {
                id: identity.id,
                display_name: display_name.clone(),
                role: Role::User,
                phone_number: None,
            })
            .await
        {
            Ok(profile) => profile,
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "Profile creation failed after identity creation");
                self.discard_identity(user_id).await;
                return Err(AuthError::Database(e.to_string()));
            }
        };

        let tokens = self.issue_pair(user_id, Role::User).await?;

        self.record(
            user_id,
            AuditAction::UserRegister,
            json!({ "email": email, "display_name": display_name }),
        )
        .await;

        metrics::counter!("warden_signups_total").increment(1);
        tracing::info!(user_id = %user_id, "User registered");

        Ok(SignupOutcome {
            user: UserSummary::from_rows(&identity, &profile, Role::User),
            tokens,
        })
    }

    /// Exchange credentials for a fresh token pair.
    ///
    /// Pairs issued earlier stay live.
    #[tracing::instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        let email = normalize_email(email);

        let Some(identity) = self.identities.find_by_email(&email).await? else {
            let decoy = self.decoy_hash().await?;
            self.verify_password(password.to_string(), decoy).await?;
            metrics::counter!("warden_logins_total", "outcome" => "unknown_user").increment(1);
            return Err(AuthError::UserNotFound);
        };
        let user_id = identity.user_id();

        if !self
            .verify_password(password.to_string(), identity.password_hash.clone())
            .await?
        {
            self.record(
                user_id,
                AuditAction::LoginFailed,
                json!({ "reason": "password_mismatch" }),
            )
            .await;
            metrics::counter!("warden_logins_total", "outcome" => "bad_password").increment(1);
            tracing::info!(user_id = %user_id, "Login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let role = self.load_role(&identity).await?;
        let tokens = self.issue_pair(user_id, role).await?;
        self.identities.update_last_login(identity.id).await?;

        metrics::counter!("warden_logins_total", "outcome" => "success").increment(1);
        tracing::info!(user_id = %user_id, role = %role, "User logged in");

        Ok(tokens)
    }

    /// Revoke every live refresh token the subject holds.
    ///
    /// Access tokens already handed out stay valid until they expire.
    #[tracing::instrument(skip_all, fields(user_id = %subject))]
    pub async fn logout(&self, subject: UserId) -> Result<u64, AuthError> {
        let revoked = self.store.revoke_all_for_subject(subject).await?;

        self.record(
            subject,
            AuditAction::Logout,
            json!({ "revoked_refresh_tokens": revoked }),
        )
        .await;

        tracing::info!(revoked, "User logged out");
        Ok(revoked)
    }

    /// Soft-delete `target` and revoke its refresh tokens.
    ///
    /// Allowed for the owner of the account and for admins. Returns the
    /// number of refresh tokens revoked.
    #[tracing::instrument(skip_all, fields(actor_id = %actor, target_id = %target))]
    pub async fn delete_account(
        &self,
        actor: UserId,
        actor_role: Role,
        target: UserId,
    ) -> Result<u64, AuthError> {
        if actor != target && actor_role != Role::Admin {
            tracing::info!(role = %actor_role, "Account deletion refused");
            return Err(AuthError::Forbidden);
        }

        if self.identities.find_by_id(target.0).await?.is_none() {
            return Err(AuthError::UserNotFound);
        }

        // Revoke first: a failed discard then leaves a logged-out live account
        let revoked = self.store.revoke_all_for_subject(target).await?;
        self.identities.discard(target.0).await?;

        self.record(
            target,
            AuditAction::UserDelete,
            json!({ "deleted_by": actor, "revoked_refresh_tokens": revoked }),
        )
        .await;

        metrics::counter!("warden_account_deletions_total").increment(1);
        tracing::info!(revoked, "Account deleted");
        Ok(revoked)
    }

    /// Redeem a refresh token for a new pair. Each refresh token works once.
    #[tracing::instrument(skip_all)]
    pub async fn refresh_token(&self, presented: &str) -> Result<TokenPair, AuthError> {
        let claims = self.codec.verify(presented)?;

        if claims.class != TokenClass::Refresh {
            tracing::debug!(user_id = %claims.sub, class = %claims.class, "Non-refresh token presented for rotation");
            return Err(AuthError::InvalidToken);
        }

        if !self.store.consume(&fingerprint(presented)).await? {
            metrics::counter!("warden_refresh_total", "outcome" => "revoked").increment(1);
            tracing::warn!(user_id = %claims.sub, "Refresh token is not live");
            return Err(AuthError::TokenRevoked);
        }

        let tokens = self.issue_pair(claims.sub, claims.role).await?;

        metrics::counter!("warden_refresh_total", "outcome" => "rotated").increment(1);
        tracing::debug!(user_id = %claims.sub, "Refresh token rotated");

        Ok(tokens)
    }

    /// Identity and profile for an authenticated subject
    #[tracing::instrument(skip_all, fields(user_id = %subject))]
    pub async fn me(&self, subject: UserId) -> Result<UserSummary, AuthError> {
        let identity = self
            .identities
            .find_by_id(subject.0)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let profile = self.load_profile(&identity).await?;
        let role = parse_role(&profile)?;
        Ok(UserSummary::from_rows(&identity, &profile, role))
    }

    /// Most recent audit entries for an actor, newest first
    #[tracing::instrument(skip_all, fields(actor_id = %actor))]
    pub async fn audit_trail(&self, actor: UserId, limit: i64) -> Result<Vec<AuditRow>, AuthError> {
        let limit = limit.clamp(1, MAX_AUDIT_PAGE);
        Ok(self.audit.list_for_actor(actor.0, limit).await?)
    }

    async fn issue_pair(&self, subject: UserId, role: Role) -> Result<TokenPair, AuthError> {
        let access = self
            .codec
            .issue(subject, role, TokenClass::Access, self.config.access_ttl)?;
        let refresh = self
            .codec
            .issue(subject, role, TokenClass::Refresh, self.config.refresh_ttl)?;

        self.store
            .mark_live(&fingerprint(&refresh), subject, self.config.refresh_ttl)
            .await?;

        Ok(TokenPair::bearer(
            access,
            refresh,
            self.config.access_ttl.as_secs(),
        ))
    }

    async fn load_profile(&self, identity: &IdentityRow) -> Result<ProfileRow, AuthError> {
        self.profiles.find_by_id(identity.id).await?.ok_or_else(|| {
            tracing::error!(user_id = %identity.id, "Identity has no profile");
            AuthError::Internal("profile missing for identity".to_string())
        })
    }

    async fn load_role(&self, identity: &IdentityRow) -> Result<Role, AuthError> {
        let profile = self.load_profile(identity).await?;
        parse_role(&profile)
    }

    async fn decoy_hash(&self) -> Result<String, AuthError> {
        self.decoy_hash
            .get_or_try_init(|| self.hash_password("warden-decoy-password".to_string()))
            .await
            .cloned()
    }

    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let hasher = self.hasher.clone();
        let start = std::time::Instant::now();
        let hashed = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("hashing task failed: {e}")))?;
        metrics::histogram!("warden_password_hash_seconds", "op" => "hash")
            .record(start.elapsed().as_secs_f64());
        hashed.map_err(AuthError::from)
    }

    async fn verify_password(&self, password: String, stored_hash: String) -> Result<bool, AuthError> {
        let hasher = self.hasher.clone();
        let start = std::time::Instant::now();
        let verified = tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash))
            .await
            .map_err(|e| AuthError::Internal(format!("verification task failed: {e}")))?;
        metrics::histogram!("warden_password_hash_seconds", "op" => "verify")
            .record(start.elapsed().as_secs_f64());
        Ok(verified)
    }

    /// Soft-delete an identity whose profile could not be created
    async fn discard_identity(&self, user_id: UserId) {
        match self.identities.discard(user_id.0).await {
            Ok(()) => tracing::warn!(user_id = %user_id, "Discarded partially provisioned identity"),
            Err(e) => tracing::error!(
                user_id = %user_id,
                error = %e,
                "Failed to discard partially provisioned identity; manual cleanup required"
            ),
        }
    }

    /// Append an audit entry. Failures are logged and swallowed.
    async fn record(&self, actor: UserId, action: AuditAction, details: serde_json::Value) {
        let entry = CreateAuditEntry {
            actor_id: actor.0,
            action,
            details,
        };
        if let Err(e) = self.audit.append(entry).await {
            tracing::warn!(user_id = %actor, action = %action, error = %e, "Failed to write audit entry");
        }
    }
}

impl<I, P, A> std::fmt::Debug for SessionOrchestrator<I, P, A>
where
    I: IdentityRepository,
    P: ProfileRepository,
    A: AuditRepository,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionOrchestrator")
            .field("codec", &self.codec)
            .field("store", &self.store.backend())
            .finish_non_exhaustive()
    }
}

fn parse_role(profile: &ProfileRow) -> Result<Role, AuthError> {
    profile.role().map_err(|e| {
        tracing::error!(user_id = %profile.id, error = %e, "Stored role is invalid");
        AuthError::Internal("invalid stored role".to_string())
    })
}

fn validate_signup(display_name: &str, email: &str, password: &str) -> Result<(), AuthError> {
    if display_name.is_empty() {
        return Err(AuthError::InvalidInput("username is required".to_string()));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
        _ => return Err(AuthError::InvalidInput("email is invalid".to_string())),
    }
    if password.is_empty() {
        return Err(AuthError::InvalidInput("password is required".to_string()));
    }
    Ok(())
}
