//! Database errors

use thiserror::Error;

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Unique constraint violated
    #[error("conflict: {0}")]
    Conflict(String),

    /// Record not found
    #[error("record not found")]
    NotFound,
}

impl DbError {
    /// Classify an insert failure, turning unique violations into `Conflict`
    pub fn from_insert(err: sqlx::Error, what: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::Conflict(format!("{what} already exists"))
            }
            _ => Self::Sqlx(err),
        }
    }
}

/// Database result type
pub type DbResult<T> = Result<T, DbError>;
