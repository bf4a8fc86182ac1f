//! Warden DB - Database abstractions
//!
//! Repository contracts for identities, profiles and audit entries, with
//! SQLx-based PostgreSQL implementations.
//!
//! # Example
//!
//! ```rust,ignore
//! use warden_db::{create_pool, run_migrations, Repositories};
//!
//! let pool = create_pool("postgres://localhost/warden").await?;
//! run_migrations(&pool).await?;
//! let repos = Repositories::new(pool);
//!
//! let identity = repos.identities.find_by_email("alice@example.com").await?;
//! ```

pub mod error;
pub mod models;
pub mod pg;
pub mod pool;
pub mod repo;

pub use error::{DbError, DbResult};
pub use models::*;
pub use pg::Repositories;
pub use pool::{create_pool, run_migrations, DbPool};
pub use repo::*;
