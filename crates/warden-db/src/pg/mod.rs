//! PostgreSQL repository implementations

mod audit;
mod identity;
mod profile;

pub use audit::PgAuditRepository;
pub use identity::PgIdentityRepository;
pub use profile::PgProfileRepository;

use crate::DbPool;

/// All repositories bundled together
#[derive(Clone)]
pub struct Repositories {
    pub identities: PgIdentityRepository,
    pub profiles: PgProfileRepository,
    pub audit: PgAuditRepository,
}

impl Repositories {
    /// Create all repositories from a database pool
    pub fn new(pool: DbPool) -> Self {
        Self {
            identities: PgIdentityRepository::new(pool.clone()),
            profiles: PgProfileRepository::new(pool.clone()),
            audit: PgAuditRepository::new(pool),
        }
    }
}
