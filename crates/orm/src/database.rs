//! PostgreSQL connection pool

use std::sync::Arc;
use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, Pool, Postgres};

use crate::config::DatabaseConfig;
use crate::error::ModelError;

/// Connection pool settings; durations are in seconds
#[derive(Debug, Clone, PartialEq)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: u64,
    pub idle_timeout: Option<u64>,
    pub max_lifetime: Option<u64>,
    pub test_before_acquire: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: 30,
            idle_timeout: Some(600),  // 10 minutes
            max_lifetime: Some(1800), // 30 minutes
            test_before_acquire: true,
        }
    }
}

/// Create a database pool from a validated [`DatabaseConfig`]
pub async fn create_database_pool(config: &DatabaseConfig) -> Result<Arc<Pool<Postgres>>, ModelError> {
    config.validate()?;
    create_database_pool_with_config(&config.database_url, &config.pool).await
}

/// Create a database pool with custom pool settings
pub async fn create_database_pool_with_config(
    database_url: &str,
    config: &PoolConfig,
) -> Result<Arc<Pool<Postgres>>, ModelError> {
    tracing::debug!(
        max = config.max_connections,
        min = config.min_connections,
        acquire_timeout_secs = config.acquire_timeout,
        "creating database pool"
    );

    let mut options = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout))
        .test_before_acquire(config.test_before_acquire);

    if let Some(idle_timeout) = config.idle_timeout {
        options = options.idle_timeout(Duration::from_secs(idle_timeout));
    }

    if let Some(max_lifetime) = config.max_lifetime {
        options = options.max_lifetime(Duration::from_secs(max_lifetime));
    }

    let pool = options.connect(database_url).await.map_err(|err| {
        tracing::error!(error = %err, "database pool could not connect");
        ModelError::Connection(err.to_string())
    })?;

    tracing::info!(max = config.max_connections, "database pool ready");
    Ok(Arc::new(pool))
}
