//! # Chatline Database
//!
//! Connection pooling, embedded migrations and the message store used by the
//! ingress service (history reads, health) and the delivery worker (writes).

mod store;

pub use store::{MessageStore, PostgresMessageStore, StoreError, StoreResult};

use anyhow::{Context, Result};
use chatline_config::DbConfig;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;

/// Database connection pool type
pub type DbPool = Pool<Postgres>;

/// Create a PostgreSQL connection pool
pub async fn create_pool(db_config: &DbConfig) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(db_config.max_connections)
        .acquire_timeout(Duration::from_secs(db_config.acquire_timeout_secs))
        .idle_timeout(Some(Duration::from_secs(db_config.idle_timeout_secs)))
        .test_before_acquire(true)
        .connect(&db_config.url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    Ok(pool)
}

/// Apply the embedded schema migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");
    Ok(())
}
