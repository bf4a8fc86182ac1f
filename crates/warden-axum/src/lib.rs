//! Warden Axum Integration
//!
//! Tower layers and extractors that guard Axum routes with Warden access
//! tokens.
//!
//! # Overview
//!
//! - **Layers**: [`AuthLayer`] verifies the bearer token and attaches an
//!   [`AuthenticatedPrincipal`]; [`RoleGateLayer`] restricts a route to a set
//!   of roles.
//! - **Extractors**: [`RequireAuth`], [`MaybeAuth`], [`RequireAdmin`].
//!
//! # Quick Start
//!
//! ```ignore
//! use axum::{routing::get, Router};
//! use warden_axum::{AuthLayer, RequireAuth, RoleGateLayer};
//! use warden_types::Role;
//!
//! async fn whoami(auth: RequireAuth) -> String {
//!     format!("Hello, user {}!", auth.user_id)
//! }
//!
//! let admin = Router::new()
//!     .route("/admin/stats", get(stats))
//!     .route_layer(RoleGateLayer::new([Role::Admin]));
//!
//! let app = Router::new()
//!     .route("/me", get(whoami))
//!     .merge(admin)
//!     .route_layer(AuthLayer::new(codec));
//! ```

pub mod context;
pub mod error;
pub mod extractors;
pub mod layer;

pub use context::{authorize, AuthenticatedPrincipal};
pub use error::GateError;
pub use extractors::{MaybeAuth, RequireAdmin, RequireAuth};
pub use layer::{bearer_token, AuthLayer, AuthService, GateFuture, RoleGateLayer, RoleGateService};
