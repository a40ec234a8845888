//! Common error types for musiclib

use thiserror::Error;

/// Common result type for musiclib operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the server and the migrator
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration discovery or execution error
    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// No row with the requested key
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// A unique or foreign-key constraint rejected the write
    #[error("Constraint {constraint} violated on {table}")]
    Constraint { table: &'static str, constraint: String },
}

impl Error {
    /// True when the error means "no such row"
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
