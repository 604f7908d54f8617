//! Model-related error types.

use sketchflow_streaming::StreamError;
use std::time::Duration;
use thiserror::Error;

/// Errors talking to an OpenAI-compatible endpoint.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Upstream answered with a non-success status.
    #[error("upstream request failed ({status}): {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Fully drained response body.
        body: String,
        /// Parsed `Retry-After` header.
        retry_after: Option<Duration>,
    },

    /// Request timeout.
    #[error("Request timed out")]
    Timeout,

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Invalid response from the API.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The response body could not be decoded.
    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Other error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ModelError {
    /// Check if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            ModelError::Timeout => true,
            ModelError::Connection(_) => true,
            ModelError::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Get the retry-after duration if applicable.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ModelError::Http { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// HTTP status, if the upstream answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ModelError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Create an HTTP error.
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
            retry_after: None,
        }
    }

    /// Create an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ModelError::Timeout
        } else if err.is_connect() {
            ModelError::Connection(err.to_string())
        } else if let Some(status) = err.status() {
            ModelError::http(status.as_u16(), err.to_string())
        } else if err.is_builder() {
            ModelError::Configuration(err.to_string())
        } else {
            ModelError::Other(err.into())
        }
    }
}

impl From<sketchflow_core::CoreError> for ModelError {
    fn from(err: sketchflow_core::CoreError) -> Self {
        ModelError::Configuration(err.to_string())
    }
}

impl sketchflow_retries::Retryable for ModelError {
    fn is_retryable(&self) -> bool {
        ModelError::is_retryable(self)
    }

    fn retry_after(&self) -> Option<Duration> {
        ModelError::retry_after(self)
    }

    fn status(&self) -> Option<u16> {
        ModelError::status(self)
    }
}

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable() {
        assert!(ModelError::Timeout.is_retryable());
        assert!(ModelError::Connection("failed".into()).is_retryable());
        assert!(ModelError::http(429, "slow down").is_retryable());
        assert!(ModelError::http(500, "Server error").is_retryable());
        assert!(ModelError::http(502, "Bad gateway").is_retryable());

        assert!(!ModelError::http(400, "Bad request").is_retryable());
        assert!(!ModelError::http(401, "Unauthorized").is_retryable());
        assert!(!ModelError::configuration("no key").is_retryable());
    }

    #[test]
    fn test_retry_after() {
        let err = ModelError::Http {
            status: 429,
            body: String::new(),
            retry_after: Some(Duration::from_secs(60)),
        };
        assert_eq!(err.retry_after(), Some(Duration::from_secs(60)));
        assert_eq!(ModelError::Timeout.retry_after(), None);
    }

    #[test]
    fn test_retry_policy_classification() {
        let condition = sketchflow_retries::RetryConfig::for_api().retry_on;
        assert!(condition.should_retry(&ModelError::http(503, "busy")));
        assert!(condition.should_retry(&ModelError::Connection("refused".into())));
        assert!(!condition.should_retry(&ModelError::http(401, "bad key")));
        assert!(!condition.should_retry(&ModelError::invalid_response("garbage")));
    }

    #[test]
    fn test_http_display() {
        let err = ModelError::http(401, r#"{"error":{"message":"bad key"}}"#);
        assert_eq!(
            err.to_string(),
            r#"upstream request failed (401): {"error":{"message":"bad key"}}"#
        );
        assert_eq!(err.status(), Some(401));
    }
}
