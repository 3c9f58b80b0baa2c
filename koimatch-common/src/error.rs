//! Common error types for koimatch

use thiserror::Error;

/// Common result type for koimatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the koimatch service
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Crush declaration whose target identity equals the declarer's own.
    /// Always rejected before any storage mutation.
    #[error("Cannot declare a crush on yourself")]
    SelfDeclaration,

    /// Notification delivery failure (best-effort, never rolls back a match)
    #[error("Notification delivery failed: {0}")]
    Notify(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
