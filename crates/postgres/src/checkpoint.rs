//! Job checkpoint store.
//!
//! The checkpoint row is the single arbiter for overlapping runs: the active
//! flag is flipped with a conditional update, never a read-then-write pair,
//! so replicas sharing one database cannot double-process a window.

use anomaly_core::{CheckpointState, Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;

use crate::client::PostgresClient;
use crate::schema::JOB_NAME;

#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Current watermark and active flag. Errors when the row was never
    /// provisioned.
    async fn state(&self) -> Result<CheckpointState>;

    /// Atomically set `active = true` and return the current watermark.
    /// Returns `None` when the flag was already set - the caller lost the
    /// race and must treat the job as already running.
    async fn mark_active(&self) -> Result<Option<DateTime<Utc>>>;

    /// Atomically set `active = false`. A non-null watermark replaces the
    /// stored one; null leaves it untouched. Returns the stored watermark.
    async fn mark_inactive(&self, new_watermark: Option<DateTime<Utc>>)
        -> Result<DateTime<Utc>>;
}

const GET_STATE_STMT: &str = r#"
    SELECT ts, is_active FROM anomaly_check_job WHERE name = $1
"#;

const MARK_ACTIVE_STMT: &str = r#"
    UPDATE
        anomaly_check_job
    SET
        is_active = true
    WHERE
        name = $1 AND is_active = false
    RETURNING
        ts
"#;

const MARK_INACTIVE_STMT: &str = r#"
    UPDATE
        anomaly_check_job
    SET
        is_active = false,
        ts = COALESCE($2, ts)
    WHERE
        name = $1
    RETURNING
        ts
"#;

/// Postgres-backed checkpoint store.
#[derive(Clone)]
pub struct PgCheckpointStore {
    client: PostgresClient,
}

impl PgCheckpointStore {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CheckpointStore for PgCheckpointStore {
    async fn state(&self) -> Result<CheckpointState> {
        let row = sqlx::query(GET_STATE_STMT)
            .bind(JOB_NAME)
            .fetch_one(self.client.pool())
            .await
            .map_err(|e| Error::checkpoint(format!("failed to read checkpoint row: {e}")))?;

        Ok(CheckpointState {
            watermark: row.get("ts"),
            active: row.get("is_active"),
        })
    }

    async fn mark_active(&self) -> Result<Option<DateTime<Utc>>> {
        let row = sqlx::query(MARK_ACTIVE_STMT)
            .bind(JOB_NAME)
            .fetch_optional(self.client.pool())
            .await
            .map_err(|e| Error::checkpoint(format!("failed to mark job as active: {e}")))?;

        Ok(row.map(|r| r.get("ts")))
    }

    async fn mark_inactive(
        &self,
        new_watermark: Option<DateTime<Utc>>,
    ) -> Result<DateTime<Utc>> {
        let row = sqlx::query(MARK_INACTIVE_STMT)
            .bind(JOB_NAME)
            .bind(new_watermark)
            .fetch_one(self.client.pool())
            .await
            .map_err(|e| Error::checkpoint(format!("failed to mark job as inactive: {e}")))?;

        Ok(row.get("ts"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PostgresConfig;
    use crate::health::init_schema;
    use chrono::TimeZone;

    async fn test_store() -> Option<PgCheckpointStore> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;
        let client = PostgresClient::connect(PostgresConfig {
            url,
            ..PostgresConfig::default()
        })
        .await
        .expect("db should connect");

        init_schema(&client).await.ok()?;

        // Reset the row so tests are order-independent.
        sqlx::query("UPDATE anomaly_check_job SET is_active = false, ts = to_timestamp(0) WHERE name = $1")
            .bind(JOB_NAME)
            .execute(client.pool())
            .await
            .ok()?;

        Some(PgCheckpointStore::new(client))
    }

    #[tokio::test]
    async fn mark_active_wins_only_once() {
        let store = match test_store().await {
            Some(s) => s,
            None => return,
        };

        let first = store.mark_active().await.expect("first flip");
        assert!(first.is_some());

        let second = store.mark_active().await.expect("second flip");
        assert!(second.is_none(), "second caller must lose the race");

        store.mark_inactive(None).await.expect("cleanup");
    }

    #[tokio::test]
    async fn mark_inactive_preserves_watermark_on_none() {
        let store = match test_store().await {
            Some(s) => s,
            None => return,
        };

        let before = store.state().await.expect("state").watermark;
        store.mark_active().await.expect("flip");
        let after = store.mark_inactive(None).await.expect("unflip");
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn mark_inactive_replaces_watermark_on_some() {
        let store = match test_store().await {
            Some(s) => s,
            None => return,
        };

        let new_ts = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        store.mark_active().await.expect("flip");
        let stored = store.mark_inactive(Some(new_ts)).await.expect("unflip");
        assert_eq!(stored, new_ts);

        let state = store.state().await.expect("state");
        assert_eq!(state.watermark, new_ts);
        assert!(!state.active);
    }
}
