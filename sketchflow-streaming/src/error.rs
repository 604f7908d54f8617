//! Streaming errors.

use thiserror::Error;

/// Errors that can occur while decoding a stream.
#[derive(Debug, Error)]
pub enum StreamError {
    /// A single line grew past the decoder's limit without a newline.
    #[error("SSE line exceeds {limit} bytes")]
    BufferOverflow {
        /// The limit that was exceeded.
        limit: usize,
    },

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Connection closed unexpectedly.
    #[error("Connection closed unexpectedly")]
    ConnectionClosed,
}

/// Result type for streaming operations.
pub type StreamResult<T> = Result<T, StreamError>;
