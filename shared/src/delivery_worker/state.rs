// ============================================================================
// Delivery Worker State
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use chatline_config::WorkerConfig;
use chatline_db::MessageStore;

/// Everything the consumption loop needs besides the record source
#[derive(Clone)]
pub struct WorkerState {
    pub store: Arc<dyn MessageStore>,
    /// Per-poll wait
    pub poll_wait: Duration,
    /// Pause after a read error before polling again
    pub error_backoff: Duration,
}

impl WorkerState {
    pub fn new(store: Arc<dyn MessageStore>, config: &WorkerConfig) -> Self {
        Self {
            store,
            poll_wait: config.poll_wait(),
            error_backoff: config.error_backoff(),
        }
    }
}
