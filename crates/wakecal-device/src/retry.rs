//! Retry budget for failed polls.
//!
//! The default budget is zero: the first failed poll stops the device loop.
//! With a budget, transient fetch failures push the next poll out by an
//! exponential backoff and a successful poll resets the count.

use std::time::Duration;

/// Backoff parameters for failed polls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Consecutive retryable failures tolerated before halting.
    pub max_retries: u32,
    /// Delay after the first failure.
    pub initial_backoff: Duration,
    /// Upper bound on any single delay.
    pub max_backoff: Duration,
    /// Growth factor per additional failure.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::from_secs(5),
            max_backoff: Duration::from_secs(300),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Policy with the given budget and default backoff.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Builder: set backoff parameters.
    pub fn with_backoff(mut self, initial: Duration, max: Duration, multiplier: f64) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max;
        self.multiplier = multiplier;
        self
    }

    /// Calculates backoff delay based on consecutive failures.
    pub fn backoff_delay(&self, consecutive_failures: u32) -> Duration {
        if consecutive_failures == 0 {
            return Duration::ZERO;
        }

        let base = self.initial_backoff.as_secs_f64();
        let exponent = i32::try_from(consecutive_failures - 1).unwrap_or(i32::MAX);
        let delay = base * self.multiplier.powi(exponent);
        let max = self.max_backoff.as_secs_f64();

        Duration::from_secs_f64(delay.min(max))
    }

    /// True if `consecutive_failures` is still within budget.
    pub fn allows(&self, consecutive_failures: u32) -> bool {
        consecutive_failures <= self.max_retries
    }
}

/// Consecutive-failure bookkeeping for the poll loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryState {
    /// Number of consecutive poll failures.
    pub consecutive_failures: u32,
    /// Last error message.
    pub last_error: Option<String>,
}

impl RetryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful poll.
    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
        self.last_error = None;
    }

    /// Records a failed poll and returns the new failure count.
    pub fn record_failure(&mut self, error: impl Into<String>) -> u32 {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.last_error = Some(error.into());
        self.consecutive_failures
    }
}
