// ============================================================================
// Worker Configuration
// ============================================================================

use std::time::Duration;

use crate::constants::{DEFAULT_ERROR_BACKOFF_MS, DEFAULT_POLL_WAIT_MS};
use crate::env_or;

/// Delivery worker specific configuration
#[derive(Clone, Debug)]
pub struct WorkerConfig {
    /// How long a single poll waits for a record
    pub poll_wait_ms: u64,
    /// Pause after a broker read error before polling again
    pub error_backoff_ms: u64,
}

impl WorkerConfig {
    pub(crate) fn from_env() -> Self {
        Self {
            poll_wait_ms: env_or("WORKER_POLL_WAIT_MS", DEFAULT_POLL_WAIT_MS),
            error_backoff_ms: env_or("WORKER_ERROR_BACKOFF_MS", DEFAULT_ERROR_BACKOFF_MS),
        }
    }

    pub fn poll_wait(&self) -> Duration {
        Duration::from_millis(self.poll_wait_ms)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_millis(self.error_backoff_ms)
    }
}
