//! # sketchflow-retries
//!
//! Retry policy for opening upstream streams.
//!
//! The transport never retries on its own. Callers that want resilience wrap
//! the *open* step (before any event has been produced) in [`with_retry`].
//! Once a stream is flowing, failures are final.
//!
//! ## Core Concepts
//!
//! - **[`RetryConfig`]**: how many retries and how long to wait
//! - **[`WaitStrategy`]**: fixed, exponential, jittered, or `Retry-After`
//! - **[`RetryCondition`]**: which statuses are worth another attempt
//! - **[`Retryable`]**: how an error type reports transience
//!
//! ## Example
//!
//! ```rust
//! use sketchflow_retries::{with_retry, RetryConfig, RetryableError};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let config = RetryConfig::new()
//!     .max_retries(3)
//!     .exponential_jitter(Duration::from_millis(1), Duration::from_millis(5), 0.1);
//!
//! let result = with_retry(&config, || async { Ok::<_, RetryableError>("open") }).await;
//! assert_eq!(result.unwrap(), "open");
//! # });
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod executor;

// Re-exports
pub use config::{RetryCondition, RetryConfig, WaitStrategy};
pub use error::{RetryResult, Retryable, RetryableError};
pub use executor::{with_retry, with_retry_state, RetryState};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{with_retry, RetryConfig, RetryResult, Retryable, RetryableError, WaitStrategy};
}
