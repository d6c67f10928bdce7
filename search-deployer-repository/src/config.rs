//! Configuration types for the search admin service.

use std::time::Duration;

/// Bounds of the readiness wait performed before destructive operations.
///
/// The wait polls the backend health with exponential backoff, starting at
/// `initial_backoff` and doubling up to `max_backoff`, and gives up once
/// `timeout` has elapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessConfig {
    /// Total time allowed for the backend to become ready.
    pub timeout: Duration,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound of the delay between retries.
    pub max_backoff: Duration,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(15),
        }
    }
}

impl ReadinessConfig {
    /// Create a config with a custom total timeout and default backoff.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    /// The delay to use after `current`, capped at `max_backoff`.
    pub fn next_backoff(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max_backoff)
    }
}
