//! Common error types for Showdeck

use thiserror::Error;

/// Common result type for Showdeck operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Showdeck crates
#[derive(Error, Debug)]
pub enum Error {
    /// Archive document could not be fetched (network or file system)
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Archive source answered with a non-success HTTP status
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// Archive document is not valid JSON (wraps serde_json::Error)
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Archive document parsed but violates the expected shape
    #[error("Schema error: {0}")]
    Schema(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested element or item not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
