// ============================================================================
// Delivery Worker Module
// ============================================================================
//
// Sequential consumption loop: read one record, persist it, store its
// offset, repeat. One conversation maps to one partition, so a single
// sequential consumer keeps per-conversation order.
//
// - state.rs: Shared state for the loop
// - processor.rs: Per-record processing logic
//
// ============================================================================

pub mod processor;
pub mod state;

pub use processor::{decode_record, process_record, ProcessError, ProcessResult};
pub use state::WorkerState;

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::kafka::{RecordSource, TransportError, TransportRecord};
use crate::metrics;

const STATS_LOG_INTERVAL: Duration = Duration::from_secs(60);

/// Counters kept by the loop, returned when it exits
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerStats {
    pub delivered: u64,
    pub status_not_applied: u64,
    pub abandoned: u64,
    pub read_errors: u64,
}

/// Run the consumption loop until `shutdown` fires.
///
/// Per-record failures are logged and never end the loop. Read errors other
/// than cancellation are logged and followed by a short backoff.
pub async fn run_consumer_loop(
    state: &WorkerState,
    source: &dyn RecordSource,
    shutdown: &CancellationToken,
) -> WorkerStats {
    let mut stats = WorkerStats::default();
    let mut last_stats_log = Instant::now();

    info!(poll_wait_ms = state.poll_wait.as_millis(), "Delivery loop started");

    while !shutdown.is_cancelled() {
        match source.read(state.poll_wait, shutdown).await {
            Ok(Some(record)) => {
                handle_record(state, source, &record, &mut stats).await;
            }
            Ok(None) => {}
            Err(TransportError::Cancelled) => break,
            Err(e) => {
                stats.read_errors += 1;
                error!(error = %e, "Failed to read from topic");
                tokio::select! {
                    _ = tokio::time::sleep(state.error_backoff) => {}
                    _ = shutdown.cancelled() => break,
                }
            }
        }

        if last_stats_log.elapsed() >= STATS_LOG_INTERVAL {
            info!(
                delivered = stats.delivered,
                status_not_applied = stats.status_not_applied,
                abandoned = stats.abandoned,
                read_errors = stats.read_errors,
                "Delivery worker stats"
            );
            last_stats_log = Instant::now();
        }
    }

    info!(
        delivered = stats.delivered,
        abandoned = stats.abandoned,
        "Delivery loop stopped"
    );
    stats
}

async fn handle_record(
    state: &WorkerState,
    source: &dyn RecordSource,
    record: &TransportRecord,
    stats: &mut WorkerStats,
) {
    match process_record(state, record).await {
        Ok(ProcessResult::Delivered) => {
            stats.delivered += 1;
            metrics::MESSAGES_DELIVERED_TOTAL.inc();
        }
        Ok(ProcessResult::StatusNotApplied) => {
            stats.status_not_applied += 1;
        }
        Err(e) => {
            stats.abandoned += 1;
            metrics::RECORDS_ABANDONED_TOTAL.inc();
            match &e {
                ProcessError::Deserialize(_) | ProcessError::Transition(_) => warn!(
                    error = %e,
                    partition = record.partition,
                    offset = record.offset,
                    key = record.key.as_deref().unwrap_or(""),
                    "Skipping undecodable record"
                ),
                ProcessError::Store(_) => error!(
                    error = %e,
                    partition = record.partition,
                    offset = record.offset,
                    key = record.key.as_deref().unwrap_or(""),
                    "Failed to persist record, abandoning it"
                ),
            }
        }
    }

    // Handled or abandoned, the loop moves past it either way
    match source.acknowledge(record) {
        Ok(()) => debug!(
            partition = record.partition,
            offset = record.offset,
            "Offset stored"
        ),
        Err(e) => error!(
            error = %e,
            partition = record.partition,
            offset = record.offset,
            "Failed to store offset"
        ),
    }
}
