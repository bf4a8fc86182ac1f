//! Tower middleware layers for Warden gates.
//!
//! [`AuthLayer`] verifies the bearer token and attaches the principal;
//! [`RoleGateLayer`] must sit inside it and checks the principal's role.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::http::{header, HeaderMap, Request};
use axum::response::{IntoResponse, Response};
use pin_project_lite::pin_project;
use tower::{Layer, Service};
use warden_auth_core::TokenCodec;
use warden_types::{Role, TokenClass};

use crate::context::{authorize, AuthenticatedPrincipal};
use crate::error::GateError;

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// The scheme is matched case-insensitively; the token must be a single
/// non-empty word.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() || token.contains(' ') {
        return None;
    }
    Some(token)
}

/// Tower layer that authenticates requests with an access token.
#[derive(Clone)]
pub struct AuthLayer {
    codec: TokenCodec,
}

impl AuthLayer {
    /// Create a new auth layer verifying with `codec`.
    #[must_use]
    pub fn new(codec: TokenCodec) -> Self {
        Self { codec }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            codec: self.codec.clone(),
        }
    }
}

/// The authentication service.
#[derive(Clone)]
pub struct AuthService<S> {
    inner: S,
    codec: TokenCodec,
}

impl<S> AuthService<S> {
    fn authenticate(&self, headers: &HeaderMap) -> Result<AuthenticatedPrincipal, GateError> {
        let token = bearer_token(headers).ok_or(GateError::MissingCredentials)?;

        let claims = self.codec.verify(token).map_err(|e| {
            tracing::debug!(reason = %e, "Bearer token rejected");
            GateError::InvalidToken
        })?;

        if claims.class != TokenClass::Access {
            tracing::debug!(user_id = %claims.sub, class = %claims.class, "Non-access token used as bearer credential");
            return Err(GateError::InvalidToken);
        }

        Ok(AuthenticatedPrincipal::from(&claims))
    }
}

impl<S, B> Service<Request<B>> for AuthService<S>
where
    S: Service<Request<B>, Response = Response>,
{
    type Response = Response;
    type Error = S::Error;
    type Future = GateFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        match self.authenticate(req.headers()) {
            Ok(principal) => {
                req.extensions_mut().insert(principal);
                GateFuture::Inner {
                    future: self.inner.call(req),
                }
            }
            Err(err) => GateFuture::Rejected {
                response: Some(err.into_response()),
            },
        }
    }
}

/// Tower layer that admits only principals holding one of the given roles.
#[derive(Clone)]
pub struct RoleGateLayer {
    allowed: Arc<[Role]>,
}

impl RoleGateLayer {
    /// Create a role gate for the given allow-set.
    #[must_use]
    pub fn new(allowed: impl IntoIterator<Item = Role>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }
}

impl<S> Layer<S> for RoleGateLayer {
    type Service = RoleGateService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RoleGateService {
            inner,
            allowed: Arc::clone(&self.allowed),
        }
    }
}

/// The role gate service.
#[derive(Clone)]
pub struct RoleGateService<S> {
    inner: S,
    allowed: Arc<[Role]>,
}

impl<S, B> Service<Request<B>> for RoleGateService<S>
where
    S: Service<Request<B>, Response = Response>,
{
    type Response = Response;
    type Error = S::Error;
    type Future = GateFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        let verdict = match req.extensions().get::<AuthenticatedPrincipal>() {
            Some(principal) => authorize(principal, &self.allowed).inspect_err(|_| {
                tracing::info!(user_id = %principal.user_id, role = %principal.role, "Role not permitted");
            }),
            None => Err(GateError::MissingCredentials),
        };

        match verdict {
            Ok(()) => GateFuture::Inner {
                future: self.inner.call(req),
            },
            Err(err) => GateFuture::Rejected {
                response: Some(err.into_response()),
            },
        }
    }
}

pin_project! {
    /// Response future shared by the gate services.
    #[project = GateFutureProj]
    pub enum GateFuture<F> {
        Inner {
            #[pin]
            future: F,
        },
        Rejected {
            response: Option<Response>,
        },
    }
}

impl<F, E> Future for GateFuture<F>
where
    F: Future<Output = Result<Response, E>>,
{
    type Output = Result<Response, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.project() {
            GateFutureProj::Inner { future } => future.poll(cx),
            GateFutureProj::Rejected { response } => {
                Poll::Ready(Ok(response.take().unwrap_or_default()))
            }
        }
    }
}
