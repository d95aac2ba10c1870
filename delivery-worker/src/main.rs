// ============================================================================
// Delivery Worker
// ============================================================================
//
// Consumes the message topic and makes each message durable:
//
// 1. Read one record (waiting at most WORKER_POLL_WAIT_MS)
// 2. Create the conversation if needed, insert the message as SENT
// 3. Mark it DELIVERED
// 4. Store the offset, whether the record was persisted or abandoned
//
// Records are processed one at a time. A record that cannot be decoded or
// persisted is logged and skipped. SIGTERM/Ctrl-C stops the loop between
// records or interrupts a pending read.
//
// ============================================================================

use anyhow::{Context, Result};
use chatline_config::Config;
use chatline_db::{create_pool, run_migrations, PostgresMessageStore};
use chatline_shared::delivery_worker::{run_consumer_loop, WorkerState};
use chatline_shared::kafka::MessageConsumer;
use chatline_shared::{shutdown, telemetry};
use std::sync::Arc;
use tracing::{info, Instrument};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    telemetry::init_tracing(&config.logging)?;

    run(config)
        .instrument(telemetry::component_span("worker"))
        .await
}

async fn run(config: Config) -> Result<()> {
    info!("=== Delivery Worker Starting ===");
    info!(
        brokers = %config.kafka.brokers,
        topic = %config.kafka.topic,
        group = %config.kafka.consumer_group,
        "Configuration loaded"
    );

    info!("Connecting to database...");
    let db_pool = create_pool(&config.db).await?;
    if config.db.run_migrations {
        run_migrations(&db_pool).await?;
    }
    info!("Connected to database");

    let consumer =
        MessageConsumer::new(&config.kafka).context("Failed to initialize Kafka consumer")?;

    let shutdown = shutdown::install_signal_handler();
    let state = WorkerState::new(
        Arc::new(PostgresMessageStore::new(db_pool.clone())),
        &config.worker,
    );

    let stats = run_consumer_loop(&state, &consumer, &shutdown).await;

    db_pool.close().await;
    info!(
        delivered = stats.delivered,
        abandoned = stats.abandoned,
        read_errors = stats.read_errors,
        "Delivery Worker stopped"
    );
    Ok(())
}
