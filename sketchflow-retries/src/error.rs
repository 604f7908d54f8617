//! Retry error types.

use std::time::Duration;
use thiserror::Error;

/// Errors a retry policy can classify.
///
/// Implemented by the error types of crates whose operations are retried,
/// so the executor can stay generic.
pub trait Retryable: std::fmt::Display {
    /// Whether the failure is transient.
    fn is_retryable(&self) -> bool;

    /// Server-suggested wait before the next attempt.
    fn retry_after(&self) -> Option<Duration> {
        None
    }

    /// HTTP status, if the failure was an HTTP answer.
    fn status(&self) -> Option<u16> {
        None
    }
}

/// A generic retryable error.
#[derive(Debug, Error)]
pub enum RetryableError {
    /// HTTP error with status code.
    #[error("HTTP error {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
        /// Retry-After header value.
        retry_after: Option<Duration>,
    },

    /// Timeout.
    #[error("Timeout")]
    Timeout,

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Other error.
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl RetryableError {
    /// Create an HTTP error.
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
            retry_after: None,
        }
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }
}

impl Retryable for RetryableError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status, .. } => *status == 429 || (500..=599).contains(status),
            Self::Timeout => true,
            Self::Connection(_) => true,
            Self::Other(_) => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Http { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for retry operations.
pub type RetryResult<T> = Result<T, RetryableError>;
