//! Bounded retry policies

use jogkit_settings::TimingSettings;
use std::time::Duration;

/// A fixed interval and a hard attempt cap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl RetryPolicy {
    pub const fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Default idle wait: 20 polls, 500 ms apart
    pub const fn idle_wait() -> Self {
        Self::new(Duration::from_millis(500), 20)
    }

    /// Default write retry: 3 attempts, 500 ms apart
    pub const fn write() -> Self {
        Self::new(Duration::from_millis(500), 3)
    }

    pub fn idle_wait_from(timing: &TimingSettings) -> Self {
        Self::new(
            Duration::from_millis(timing.poll_interval_ms),
            timing.max_polls,
        )
    }

    pub fn write_from(timing: &TimingSettings) -> Self {
        Self::new(
            Duration::from_millis(timing.write_backoff_ms),
            timing.write_retries,
        )
    }

    /// Upper bound on the time spent waiting under this policy
    pub fn worst_case(&self) -> Duration {
        self.interval.saturating_mul(self.max_attempts)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::idle_wait()
    }
}
