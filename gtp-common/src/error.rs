//! Common error types for GTP

use thiserror::Error;

/// Common result type for GTP operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across GTP services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization or deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Stored state is inconsistent with the requested operation
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
