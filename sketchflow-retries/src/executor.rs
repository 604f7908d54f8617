//! Retry executor for running operations with retries.

use crate::config::RetryConfig;
use crate::error::Retryable;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// State of a retry run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryState {
    /// Current attempt number (1-indexed).
    pub attempt: u32,
    /// Last error message.
    pub last_error: Option<String>,
    /// Total time spent waiting.
    pub total_wait_time: Duration,
}

/// Execute an operation with retries.
///
/// # Example
///
/// ```ignore
/// use sketchflow_retries::{with_retry, RetryConfig};
///
/// let config = RetryConfig::for_api();
/// let stream = with_retry(&config, || client.stream(&messages)).await?;
/// ```
pub async fn with_retry<F, Fut, T, E>(config: &RetryConfig, operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable,
{
    with_retry_state(config, operation).await.0
}

/// Execute with retries and report how it went.
pub async fn with_retry_state<F, Fut, T, E>(
    config: &RetryConfig,
    mut operation: F,
) -> (Result<T, E>, RetryState)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable,
{
    let mut state = RetryState::default();
    let max_attempts = config.max_attempts();

    loop {
        state.attempt += 1;

        debug!(
            attempt = state.attempt,
            max_attempts,
            "Executing retry attempt"
        );

        match operation().await {
            Ok(result) => return (Ok(result), state),
            Err(error) => {
                let should_retry =
                    state.attempt < max_attempts && config.retry_on.should_retry(&error);

                if !should_retry {
                    if state.attempt > 1 {
                        warn!(
                            attempt = state.attempt,
                            error = %error,
                            "Retry exhausted or error not retryable"
                        );
                    }
                    return (Err(error), state);
                }

                let wait = config.wait.calculate(state.attempt, error.retry_after());
                state.total_wait_time += wait;
                state.last_error = Some(error.to_string());

                warn!(
                    attempt = state.attempt,
                    wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                    error = %error,
                    "Transient failure, retrying"
                );

                sleep(wait).await;
            }
        }
    }
}
