//! Anomaly verdict store.

use anomaly_core::{AnomalyVerdict, Error, Result};
use async_trait::async_trait;

use crate::client::PostgresClient;

#[async_trait]
pub trait AnomalyStore: Send + Sync {
    /// Upsert a batch of verdicts in a single transaction. All-or-nothing:
    /// a failure rolls back every row of the batch.
    async fn upsert_batch(&self, verdicts: &[AnomalyVerdict]) -> Result<()>;
}

const UPSERT_ANOMALY_STMT: &str = r#"
    INSERT INTO
        requests_anomalies(root_id, is_anomaly, anomaly_cases, net_probability)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (root_id) DO UPDATE SET
        is_anomaly = $2,
        anomaly_cases = $3,
        net_probability = $4
"#;

/// Postgres-backed anomaly store.
#[derive(Clone)]
pub struct PgAnomalyStore {
    client: PostgresClient,
}

impl PgAnomalyStore {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AnomalyStore for PgAnomalyStore {
    async fn upsert_batch(&self, verdicts: &[AnomalyVerdict]) -> Result<()> {
        if verdicts.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .client
            .pool()
            .begin()
            .await
            .map_err(|e| Error::store(format!("failed to start tx: {e}")))?;

        for v in verdicts {
            sqlx::query(UPSERT_ANOMALY_STMT)
                .bind(&v.root_id)
                .bind(v.is_anomaly)
                .bind(&v.anomaly_cases)
                .bind(v.net_probability)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    Error::store(format!("failed to upsert request anomaly: {e}"))
                })?;
        }

        tx.commit()
            .await
            .map_err(|e| Error::store(format!("failed to commit anomalies tx: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PostgresConfig;
    use crate::health::init_schema;
    use sqlx::Row;

    async fn test_store() -> Option<PgAnomalyStore> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;
        let client = PostgresClient::connect(PostgresConfig {
            url,
            ..PostgresConfig::default()
        })
        .await
        .expect("db should connect");

        init_schema(&client).await.ok()?;

        Some(PgAnomalyStore::new(client))
    }

    #[tokio::test]
    async fn upsert_overwrites_by_root_id() {
        let store = match test_store().await {
            Some(s) => s,
            None => return,
        };

        let first = AnomalyVerdict {
            root_id: "test-upsert-1".to_string(),
            is_anomaly: true,
            anomaly_cases: vec![1, 3],
            net_probability: Some(0.9),
        };
        store.upsert_batch(&[first]).await.expect("first upsert");

        // Re-scoring replaces the verdict wholesale.
        let second = AnomalyVerdict::clean("test-upsert-1");
        store
            .upsert_batch(std::slice::from_ref(&second))
            .await
            .expect("second upsert");

        let row = sqlx::query(
            "SELECT is_anomaly, anomaly_cases FROM requests_anomalies WHERE root_id = $1",
        )
        .bind("test-upsert-1")
        .fetch_one(store.client.pool())
        .await
        .expect("row exists");

        assert!(!row.get::<bool, _>("is_anomaly"));
        assert!(row.get::<Vec<i32>, _>("anomaly_cases").is_empty());
    }

    #[tokio::test]
    async fn empty_batch_is_a_noop() {
        let store = match test_store().await {
            Some(s) => s,
            None => return,
        };

        store.upsert_batch(&[]).await.expect("noop");
    }
}
