//! Postgres health checks and schema provisioning.

use tracing::{debug, error};

use crate::client::PostgresClient;
use crate::schema::{all_tables, seed_checkpoint, JOB_NAME};

/// Check Postgres connection health.
pub async fn check_connection(client: &PostgresClient) -> bool {
    match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(client.pool())
        .await
    {
        Ok(_) => {
            debug!("Postgres connection healthy");
            true
        }
        Err(e) => {
            error!("Postgres health check failed: {}", e);
            false
        }
    }
}

/// Provision service-owned tables and the checkpoint row.
pub async fn init_schema(client: &PostgresClient) -> Result<(), String> {
    for ddl in all_tables() {
        sqlx::query(ddl)
            .execute(client.pool())
            .await
            .map_err(|e| format!("Failed to execute DDL: {e}"))?;
    }

    sqlx::query(seed_checkpoint())
        .bind(JOB_NAME)
        .execute(client.pool())
        .await
        .map_err(|e| format!("Failed to seed checkpoint row: {e}"))?;

    debug!("Postgres schema initialized");
    Ok(())
}
