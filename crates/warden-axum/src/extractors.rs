//! Axum extractors for authentication and authorization.
//!
//! These read the [`AuthenticatedPrincipal`] that [`AuthLayer`] placed in
//! request extensions; they never verify tokens themselves.
//!
//! [`AuthLayer`]: crate::AuthLayer
//!
//! # Usage
//!
//! ```ignore
//! use warden_axum::{MaybeAuth, RequireAdmin, RequireAuth};
//!
//! // 401 if not authenticated
//! async fn protected(auth: RequireAuth) -> String {
//!     format!("Hello, {}!", auth.user_id)
//! }
//!
//! // 403 unless the principal is an admin
//! async fn admin_only(_: RequireAdmin) -> &'static str {
//!     "Admin panel"
//! }
//!
//! // Optional authentication
//! async fn maybe(auth: MaybeAuth) -> String {
//!     match auth.0 {
//!         Some(p) => format!("Hello, {}!", p.user_id),
//!         None => "Hello, guest!".to_string(),
//!     }
//! }
//! ```

use std::ops::Deref;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use warden_types::Role;

use crate::context::{authorize, AuthenticatedPrincipal};
use crate::error::GateError;

/// Extractor that requires authentication.
///
/// Returns 401 Unauthorized if no principal is present.
#[derive(Debug, Clone, Copy)]
pub struct RequireAuth(pub AuthenticatedPrincipal);

impl Deref for RequireAuth {
    type Target = AuthenticatedPrincipal;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = GateError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedPrincipal>()
            .copied()
            .map(Self)
            .ok_or(GateError::MissingCredentials)
    }
}

/// Extractor for optional authentication.
#[derive(Debug, Clone, Copy)]
pub struct MaybeAuth(pub Option<AuthenticatedPrincipal>);

impl Deref for MaybeAuth {
    type Target = Option<AuthenticatedPrincipal>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for MaybeAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<AuthenticatedPrincipal>().copied()))
    }
}

/// Extractor that requires the admin role.
///
/// Returns 401 if unauthenticated, 403 if authenticated but not an admin.
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin(pub AuthenticatedPrincipal);

impl Deref for RequireAdmin {
    type Target = AuthenticatedPrincipal;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = GateError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(principal) = RequireAuth::from_request_parts(parts, state).await?;
        authorize(&principal, &[Role::Admin])?;
        Ok(Self(principal))
    }
}
