//! Agent-specific error types.
//!
//! Only failures that happen before any event is produced are returned as
//! [`AgentError`]. Once a [`DrawStream`](crate::DrawStream) exists, every
//! failure is reported in-band as an `Error` event.

use sketchflow_models::ModelError;
use sketchflow_output::OutputError;
use thiserror::Error;

/// Errors that can occur while setting up a drawing request.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The request had nothing to draw.
    #[error("please provide a drawing description")]
    EmptyPrompt,

    /// The agent was configured incorrectly.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Model call failed.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Model output could not be turned into a drawing.
    #[error(transparent)]
    Output(#[from] OutputError),

    /// Other error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AgentError {
    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// HTTP status of an upstream failure, if any.
    #[must_use]
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Model(ModelError::Http { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

/// Result type for agent operations.
pub type AgentResult<T> = Result<T, AgentError>;
