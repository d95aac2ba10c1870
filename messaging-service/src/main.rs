// ============================================================================
// Messaging Service - HTTP ingress
// ============================================================================
//
// Accepts messages over HTTP, publishes them to Kafka keyed by
// conversation_id and answers 202 once the broker has acknowledged the
// record. Also serves conversation history straight from PostgreSQL.
//
// ============================================================================

use anyhow::{Context, Result};
use chatline_config::Config;
use chatline_db::{create_pool, run_migrations, MessageStore, PostgresMessageStore};
use chatline_shared::auth::TokenVerifier;
use chatline_shared::context::AppContext;
use chatline_shared::ingress::IngressProcessor;
use chatline_shared::kafka::MessageProducer;
use chatline_shared::{routes, shutdown, telemetry};
use std::sync::Arc;
use tracing::{info, warn, Instrument};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    telemetry::init_tracing(&config.logging)?;

    run(config)
        .instrument(telemetry::component_span("api"))
        .await
}

async fn run(config: Config) -> Result<()> {
    info!("=== Messaging Service Starting ===");
    info!(
        port = config.http_port,
        brokers = %config.kafka.brokers,
        topic = %config.kafka.topic,
        "Configuration loaded"
    );
    if config.auth.uses_default_secret() {
        warn!("JWT_SECRET is not set, using the development secret");
    }

    info!("Connecting to database...");
    let db_pool = create_pool(&config.db).await?;
    if config.db.run_migrations {
        run_migrations(&db_pool).await?;
    }
    let store: Arc<dyn MessageStore> = Arc::new(PostgresMessageStore::new(db_pool.clone()));
    info!("Connected to database");

    let producer =
        Arc::new(MessageProducer::new(&config.kafka).context("Failed to create Kafka producer")?);

    let shutdown = shutdown::install_signal_handler();
    let ingress = Arc::new(IngressProcessor::new(
        producer.clone(),
        config.publish_timeout(),
        shutdown.clone(),
    ));
    let verifier = Arc::new(TokenVerifier::new(&config.auth));
    let context = Arc::new(AppContext::new(ingress, store, verifier));

    let app = routes::create_router(context);

    let addr = config.http_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    info!(addr = %addr, "Messaging Service listening");

    let server_shutdown = shutdown.clone();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move { server_shutdown.cancelled().await });
    let mut server_task = tokio::spawn(async move { server.await });

    let grace = config.shutdown_timeout();
    tokio::select! {
        result = &mut server_task => {
            result.context("Server task panicked")?.context("Server error")?;
        }
        _ = shutdown.cancelled() => {
            info!(grace_secs = grace.as_secs(), "Draining in-flight requests");
            match tokio::time::timeout(grace, &mut server_task).await {
                Ok(result) => {
                    result.context("Server task panicked")?.context("Server error")?;
                }
                Err(_) => {
                    warn!("Graceful shutdown timed out, aborting open connections");
                    server_task.abort();
                }
            }
        }
    }

    let flush_producer = producer.clone();
    match tokio::task::spawn_blocking(move || flush_producer.flush(grace)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, "Kafka producer flush incomplete"),
        Err(e) => warn!(error = %e, "Kafka producer flush task failed"),
    }

    db_pool.close().await;
    info!("Messaging Service stopped");
    Ok(())
}
