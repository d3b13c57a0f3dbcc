//! Backoff schedule for re-sending Platform API requests.

use std::time::Duration;

/// How [`PlatformClient`](super::PlatformClient) re-sends a failed request.
///
/// Applies to GET, PUT and DELETE calls that fail with a 5xx, a 429, a
/// timeout or a transport error. POST calls are never re-sent. A
/// `Retry-After` header from a 429 replaces the computed delay, capped at
/// `max_delay`.
///
/// Not to be confused with [`WebhookRetryPolicy`](super::WebhookRetryPolicy),
/// which the platform applies to its own webhook deliveries.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Re-sends allowed after the first attempt
    pub max_retries: u32,

    /// Wait before the first re-send
    pub initial_delay: Duration,

    /// Upper bound on any single wait, including server-requested ones
    pub max_delay: Duration,

    /// Growth factor applied to the wait after each re-send
    pub backoff_multiplier: f64,

    /// Spread each wait randomly by ±25%
    pub use_jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            use_jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Policy with the given bounds, doubling backoff and jitter on.
    pub fn new(max_retries: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
            max_delay,
            backoff_multiplier: 2.0,
            use_jitter: true,
        }
    }

    /// Every request is sent once.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Turn jitter on.
    pub fn with_jitter(mut self) -> Self {
        self.use_jitter = true;
        self
    }

    /// Turn jitter off, making delays exact.
    ///
    /// # Examples
    ///
    /// ```
    /// use platform_api_sdk::client::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::default().without_jitter();
    /// assert_eq!(policy.calculate_delay(1), Duration::from_millis(100));
    /// assert_eq!(policy.calculate_delay(3), Duration::from_millis(400));
    /// ```
    pub fn without_jitter(mut self) -> Self {
        self.use_jitter = false;
        self
    }

    /// Wait before re-send number `attempt`, counted from 1.
    ///
    /// `initial_delay * backoff_multiplier^(attempt - 1)`, capped at
    /// `max_delay`. Attempt 0 is the original send and waits nothing.
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::from_secs(0);
        }

        let multiplier = self.backoff_multiplier.powi(attempt as i32 - 1);
        let delay_ms = (self.initial_delay.as_millis() as f64 * multiplier) as u64;
        let mut delay = Duration::from_millis(delay_ms).min(self.max_delay);

        if self.use_jitter {
            use rand::Rng;
            let jitter_factor = rand::thread_rng().gen_range(0.75..=1.25);
            delay = Duration::from_millis((delay.as_millis() as f64 * jitter_factor) as u64);
        }

        delay
    }

    /// Whether a request that has already been re-sent `attempt` times may
    /// go out again.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
