//! Error types for waterme-core

use thiserror::Error;

/// Result type alias using waterme-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in waterme-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Plant (or other record) not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation needs a logged-in user
    #[error("No user is logged in")]
    NotAuthenticated,

    /// Remote API error surfaced to the caller
    #[error("Remote API error: {0}")]
    Api(#[from] crate::api::ApiError),
}
