use anyhow::Result;
use once_cell::sync::Lazy;
use prometheus::{opts, register_int_counter, Encoder, IntCounter, TextEncoder};

pub static MESSAGES_ACCEPTED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "chatline_messages_accepted_total",
        "Total number of messages accepted at ingress and published"
    ))
    .expect("Failed to register chatline_messages_accepted_total metric")
});

pub static MESSAGES_REJECTED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "chatline_messages_rejected_total",
        "Total number of ingress requests rejected by validation"
    ))
    .expect("Failed to register chatline_messages_rejected_total metric")
});

pub static MESSAGES_PUBLISH_FAILED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "chatline_messages_publish_failed_total",
        "Total number of validated messages that could not be published"
    ))
    .expect("Failed to register chatline_messages_publish_failed_total metric")
});

pub static MESSAGES_DELIVERED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "chatline_messages_delivered_total",
        "Total number of messages persisted and marked DELIVERED"
    ))
    .expect("Failed to register chatline_messages_delivered_total metric")
});

pub static RECORDS_ABANDONED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "chatline_records_abandoned_total",
        "Total number of consumed records skipped after a decode or persistence failure"
    ))
    .expect("Failed to register chatline_records_abandoned_total metric")
});

/// Render every registered metric in the Prometheus text format
pub fn gather_metrics() -> Result<String> {
    let mut buffer = vec![];
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder.encode(&metric_families, &mut buffer)?;

    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_show_up_in_exposition() {
        MESSAGES_ACCEPTED_TOTAL.inc();
        MESSAGES_REJECTED_TOTAL.inc();
        crate::kafka::metrics::KAFKA_PRODUCE_LATENCY.observe(0.01);

        let text = gather_metrics().unwrap();
        assert!(text.contains("chatline_messages_accepted_total"));
        assert!(text.contains("chatline_kafka_produce_latency_seconds"));
    }
}
