// ============================================================================
// Database Configuration
// ============================================================================

use crate::{env_or, env_string};

/// Database connection pool configuration
#[derive(Clone, Debug)]
pub struct DbConfig {
    /// PostgreSQL connection string
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Timeout for acquiring a connection from the pool (seconds)
    pub acquire_timeout_secs: u64,
    /// Timeout for idle connections before they are closed (seconds)
    pub idle_timeout_secs: u64,
    /// Apply embedded migrations at start-up
    pub run_migrations: bool,
}

impl DbConfig {
    pub(crate) fn from_env() -> Self {
        Self {
            url: env_string("DATABASE_URL", crate::constants::DEFAULT_DATABASE_URL),
            max_connections: env_or("DB_MAX_CONNECTIONS", 10),
            acquire_timeout_secs: env_or("DB_ACQUIRE_TIMEOUT_SECS", 30),
            idle_timeout_secs: env_or("DB_IDLE_TIMEOUT_SECS", 600),
            run_migrations: env_or("DB_RUN_MIGRATIONS", true),
        }
    }
}
