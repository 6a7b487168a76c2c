//! Database errors shared by the workspace

use sqlx::migrate::MigrateError;
use thiserror::Error;

/// Failure while setting up or migrating the database
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The pool could not reach PostgreSQL
    #[error("Failed to connect to PostgreSQL: {0}")]
    Connection(#[source] sqlx::Error),

    /// A migration failed to apply
    #[error("Failed to apply migrations: {0}")]
    Migration(#[source] MigrateError),

    /// Settings are unusable (bad URL, pool bounds)
    #[error("Invalid database configuration: {0}")]
    Configuration(String),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;
