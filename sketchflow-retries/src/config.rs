//! Retry configuration.

use crate::error::Retryable;
use std::time::Duration;

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Wait strategy.
    pub wait: WaitStrategy,
    /// Retry condition.
    pub retry_on: RetryCondition,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::for_api()
    }
}

impl RetryConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set max retries.
    #[must_use]
    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    /// Set the wait strategy.
    #[must_use]
    pub fn wait(mut self, strategy: WaitStrategy) -> Self {
        self.wait = strategy;
        self
    }

    /// Use exponential backoff with jitter.
    #[must_use]
    pub fn exponential_jitter(mut self, initial: Duration, max: Duration, jitter: f64) -> Self {
        self.wait = WaitStrategy::ExponentialJitter {
            initial,
            max,
            multiplier: 2.0,
            jitter,
        };
        self
    }

    /// Use fixed delay.
    #[must_use]
    pub fn fixed(mut self, delay: Duration) -> Self {
        self.wait = WaitStrategy::Fixed(delay);
        self
    }

    /// Set retry condition.
    #[must_use]
    pub fn retry_on(mut self, condition: RetryCondition) -> Self {
        self.retry_on = condition;
        self
    }

    /// Config for opening upstream API streams.
    ///
    /// Up to two retries on 429, 5xx, timeouts and connection failures,
    /// honouring `Retry-After` up to 30 seconds.
    pub fn for_api() -> Self {
        Self {
            max_retries: 2,
            wait: WaitStrategy::RetryAfter {
                fallback: Box::new(WaitStrategy::ExponentialJitter {
                    initial: Duration::from_millis(500),
                    max: Duration::from_secs(8),
                    multiplier: 2.0,
                    jitter: 0.1,
                }),
                max_wait: Duration::from_secs(30),
            },
            retry_on: RetryCondition::new().on_rate_limit().on_server_errors(),
        }
    }

    /// Config that never retries.
    pub fn no_retry() -> Self {
        Self::for_api().max_retries(0)
    }

    /// Total attempts including the first.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Strategy for waiting between retries.
#[derive(Debug, Clone, PartialEq)]
pub enum WaitStrategy {
    /// No waiting.
    None,
    /// Fixed delay.
    Fixed(Duration),
    /// Exponential backoff.
    ExponentialBackoff {
        /// Initial delay.
        initial: Duration,
        /// Maximum delay.
        max: Duration,
        /// Multiplier for each attempt.
        multiplier: f64,
    },
    /// Exponential backoff with jitter.
    ExponentialJitter {
        /// Initial delay.
        initial: Duration,
        /// Maximum delay.
        max: Duration,
        /// Multiplier for each attempt.
        multiplier: f64,
        /// Jitter factor (0.0 to 1.0).
        jitter: f64,
    },
    /// Respect Retry-After header.
    RetryAfter {
        /// Fallback if no header.
        fallback: Box<WaitStrategy>,
        /// Maximum wait time.
        max_wait: Duration,
    },
}

impl WaitStrategy {
    /// Calculate the wait duration after failed attempt `attempt` (1-based).
    pub fn calculate(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        match self {
            WaitStrategy::None => Duration::ZERO,
            WaitStrategy::Fixed(d) => *d,
            WaitStrategy::ExponentialBackoff {
                initial,
                max,
                multiplier,
            } => {
                let delay = initial.as_secs_f64() * multiplier.powi(exponent);
                Duration::from_secs_f64(delay.min(max.as_secs_f64()))
            }
            WaitStrategy::ExponentialJitter {
                initial,
                max,
                multiplier,
                jitter,
            } => {
                let base = initial.as_secs_f64() * multiplier.powi(exponent);
                let jitter_amount = base * jitter * random_jitter();
                let delay = (base + jitter_amount).clamp(0.0, max.as_secs_f64());
                Duration::from_secs_f64(delay)
            }
            WaitStrategy::RetryAfter { fallback, max_wait } => retry_after
                .map(|d| d.min(*max_wait))
                .unwrap_or_else(|| fallback.calculate(attempt, None)),
        }
    }
}

/// Condition for retrying.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryCondition {
    /// HTTP status codes to retry on.
    pub on_status_codes: Vec<u16>,
}

impl RetryCondition {
    /// Create a new empty condition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add status codes to retry on.
    #[must_use]
    pub fn on_status(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.on_status_codes.extend(codes);
        self
    }

    /// Retry on server errors (5xx).
    #[must_use]
    pub fn on_server_errors(self) -> Self {
        self.on_status(500..=599)
    }

    /// Retry on rate limit (429).
    #[must_use]
    pub fn on_rate_limit(self) -> Self {
        self.on_status([429])
    }

    /// Check if an error should be retried.
    ///
    /// Errors with a status retry only when the status is listed; others
    /// defer to the error's own classification.
    pub fn should_retry<E: Retryable + ?Sized>(&self, error: &E) -> bool {
        match error.status() {
            Some(status) => self.on_status_codes.contains(&status),
            None => error.is_retryable(),
        }
    }
}

/// Generate a random jitter factor between -1.0 and 1.0.
fn random_jitter() -> f64 {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    rng.gen_range(-1.0..1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RetryableError;
    use rstest::rstest;

    #[test]
    fn test_default_config() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.max_attempts(), 3);
        assert_eq!(RetryConfig::no_retry().max_attempts(), 1);
    }

    #[test]
    fn test_wait_strategy_fixed() {
        let strategy = WaitStrategy::Fixed(Duration::from_secs(1));
        assert_eq!(strategy.calculate(1, None), Duration::from_secs(1));
        assert_eq!(strategy.calculate(3, None), Duration::from_secs(1));
    }

    #[test]
    fn test_wait_strategy_exponential() {
        let strategy = WaitStrategy::ExponentialBackoff {
            initial: Duration::from_millis(100),
            max: Duration::from_millis(300),
            multiplier: 2.0,
        };

        assert_eq!(strategy.calculate(1, None), Duration::from_millis(100));
        assert_eq!(strategy.calculate(2, None), Duration::from_millis(200));
        assert_eq!(strategy.calculate(3, None), Duration::from_millis(300));
    }

    #[test]
    fn test_wait_strategy_jitter_bounds() {
        let strategy = WaitStrategy::ExponentialJitter {
            initial: Duration::from_millis(100),
            max: Duration::from_secs(10),
            multiplier: 2.0,
            jitter: 0.5,
        };
        for _ in 0..50 {
            let wait = strategy.calculate(2, None);
            assert!(wait >= Duration::from_millis(100), "{wait:?}");
            assert!(wait <= Duration::from_millis(300), "{wait:?}");
        }
    }

    #[test]
    fn test_wait_strategy_retry_after() {
        let strategy = WaitStrategy::RetryAfter {
            fallback: Box::new(WaitStrategy::Fixed(Duration::from_secs(1))),
            max_wait: Duration::from_secs(60),
        };

        assert_eq!(
            strategy.calculate(1, Some(Duration::from_secs(5))),
            Duration::from_secs(5)
        );
        assert_eq!(
            strategy.calculate(1, Some(Duration::from_secs(600))),
            Duration::from_secs(60)
        );
        assert_eq!(strategy.calculate(1, None), Duration::from_secs(1));
    }

    #[rstest]
    #[case(RetryableError::http(429, ""), true)]
    #[case(RetryableError::http(503, ""), true)]
    #[case(RetryableError::http(400, ""), false)]
    #[case(RetryableError::http(401, ""), false)]
    #[case(RetryableError::Timeout, true)]
    #[case(RetryableError::connection("refused"), true)]
    fn test_retry_condition(#[case] error: RetryableError, #[case] expected: bool) {
        let condition = RetryCondition::new().on_rate_limit().on_server_errors();
        assert_eq!(condition.should_retry(&error), expected);
    }

    #[test]
    fn test_status_list_narrows() {
        let condition = RetryCondition::new().on_status([503]);
        assert!(condition.should_retry(&RetryableError::http(503, "")));
        assert!(!condition.should_retry(&RetryableError::http(500, "")));
    }
}
