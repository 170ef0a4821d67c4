//! Postgres client wrapper.

use std::time::Duration;

use anomaly_core::{Error, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::config::PostgresConfig;

/// Postgres pool wrapper shared by all stores.
#[derive(Clone)]
pub struct PostgresClient {
    pool: PgPool,
    config: PostgresConfig,
}

impl PostgresClient {
    /// Connects a new pool with the configured limits.
    pub async fn connect(config: PostgresConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| Error::internal(format!("failed to connect to Postgres: {e}")))?;

        info!(
            max_connections = config.max_connections,
            "Created Postgres pool"
        );

        Ok(Self { pool, config })
    }

    /// Returns the inner pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PostgresConfig {
        &self.config
    }
}
