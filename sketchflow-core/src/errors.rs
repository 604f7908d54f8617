//! Error types for sketchflow core types.

use thiserror::Error;

/// Errors raised while building or validating core types.
#[derive(Error, Debug)]
pub enum CoreError {
    /// An element spec could not be normalised.
    #[error("Invalid element: {0}")]
    InvalidElement(String),

    /// Configuration is missing or inconsistent.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// Create an invalid element error.
    pub fn invalid_element(msg: impl Into<String>) -> Self {
        Self::InvalidElement(msg.into())
    }

    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

/// Result type alias using CoreError.
pub type Result<T> = std::result::Result<T, CoreError>;
