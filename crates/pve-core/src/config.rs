use std::time::Duration;

/// Shortest delay between two status polls, whatever the configuration says.
pub const MIN_INTERVAL_MS: u64 = 100;

/// Polling cadence of [`TaskMonitor`](crate::TaskMonitor).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Delay between successful polls; values below [`MIN_INTERVAL_MS`] are raised to it.
    pub interval_ms: u64,
    /// Upper bound for the delay after failed polls.
    pub max_backoff_ms: u64,
    /// Consecutive failed polls after which the task is reported `Unknown`.
    pub max_consecutive_failures: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1_000,
            max_backoff_ms: 10_000,
            max_consecutive_failures: 5,
        }
    }
}

impl MonitorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_floor())
    }

    /// Delay after the `failures`-th consecutive failed poll: the interval
    /// doubled per failure, capped at `max_backoff_ms`.
    pub fn backoff(&self, failures: u32) -> Duration {
        let interval = self.interval_floor();
        let factor = 1u64 << failures.min(16);
        let ms = interval
            .saturating_mul(factor)
            .min(self.max_backoff_ms.max(interval));
        Duration::from_millis(ms)
    }

    fn interval_floor(&self) -> u64 {
        self.interval_ms.max(MIN_INTERVAL_MS)
    }

    /// Failure budget, never below one.
    pub fn failure_budget(&self) -> u32 {
        self.max_consecutive_failures.max(1)
    }
}
