use once_cell::sync::Lazy;
use prometheus::{register_counter, register_histogram, Counter, Histogram};

/// Kafka producer success counter
pub static KAFKA_PRODUCE_SUCCESS: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "chatline_kafka_produce_success_total",
        "Total number of acknowledged Kafka produce operations"
    )
    .expect("Failed to register chatline_kafka_produce_success_total metric")
});

/// Kafka producer failure counter (broker error, timeout or enqueue failure)
pub static KAFKA_PRODUCE_FAILURE: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "chatline_kafka_produce_failure_total",
        "Total number of failed Kafka produce operations"
    )
    .expect("Failed to register chatline_kafka_produce_failure_total metric")
});

/// Time from enqueue to delivery acknowledgement
pub static KAFKA_PRODUCE_LATENCY: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "chatline_kafka_produce_latency_seconds",
        "Kafka produce acknowledgement latency in seconds",
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("Failed to register chatline_kafka_produce_latency_seconds metric")
});

pub static KAFKA_CONSUME_SUCCESS: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "chatline_kafka_consume_success_total",
        "Total number of records read from Kafka"
    )
    .expect("Failed to register chatline_kafka_consume_success_total metric")
});

pub static KAFKA_CONSUME_FAILURE: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "chatline_kafka_consume_failure_total",
        "Total number of Kafka consumer errors"
    )
    .expect("Failed to register chatline_kafka_consume_failure_total metric")
});
