//! Common error types for the AHP workspace

use thiserror::Error;

/// Common result type for AHP operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the AHP crates
#[derive(Error, Debug)]
pub enum Error {
    /// Read or write against an external store failed
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Uniqueness violation (e.g. duplicate indicator name)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Matrices or vectors of incompatible size
    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// True for failures that came from an external store
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Error::Store(_))
    }
}
