//! Common error types for Vantage.

use thiserror::Error;

/// Result type alias using Vantage's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for Vantage operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (settings file, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a serialization error from any displayable type.
    pub fn serialization(msg: impl std::fmt::Display) -> Self {
        Self::Serialization(msg.to_string())
    }

    /// Create a config error from any displayable type.
    pub fn config(msg: impl std::fmt::Display) -> Self {
        Self::Config(msg.to_string())
    }
}
