//! Read-only access to closed service requests.

use anomaly_core::{Error, Result, ServiceRequest};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::client::PostgresClient;

#[async_trait]
pub trait RequestSource: Send + Sync {
    /// Count requests with a closure date inside `[from, to]`.
    async fn count_closed_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64>;

    /// One page of requests closed inside `[from, to]`, ordered by
    /// `root_id` for deterministic resumption.
    ///
    /// Offset-based: rows deleted mid-run could shift later offsets. Closed
    /// requests are immutable in practice, so this is an accepted limitation
    /// of the pagination scheme.
    async fn closed_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ServiceRequest>>;
}

const COUNT_CLOSED_STMT: &str = r#"
    SELECT
        count(*)
    FROM
        requests
    WHERE
        closure_date IS NOT NULL AND
        closure_date BETWEEN $1 AND $2
"#;

const PAGE_CLOSED_STMT: &str = r#"
    SELECT
        root_id,
        closure_date,
        date_of_creation,
        date_of_previous_request_close,
        deffect_category_id,
        deffect_category_name,
        work_type_done,
        urgency_category,
        owner_company,
        serving_company,
        performing_company,
        efficiency,
        times_returned,
        grade_for_service,
        hood
    FROM
        requests
    WHERE
        closure_date IS NOT NULL AND
        closure_date BETWEEN $1 AND $2
    ORDER BY root_id
    LIMIT $3
    OFFSET $4
"#;

/// Postgres-backed request source.
#[derive(Clone)]
pub struct PgRequestSource {
    client: PostgresClient,
}

impl PgRequestSource {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }

    fn map_row(row: PgRow) -> ServiceRequest {
        ServiceRequest {
            root_id: row.get("root_id"),
            closure_date: row.get("closure_date"),
            date_of_creation: row.get("date_of_creation"),
            date_of_previous_request_close: row.get("date_of_previous_request_close"),
            deffect_category_id: row.get("deffect_category_id"),
            deffect_category_name: row.get("deffect_category_name"),
            work_type_done: row.get("work_type_done"),
            urgency_category: row.get("urgency_category"),
            owner_company: row.get("owner_company"),
            serving_company: row.get("serving_company"),
            performing_company: row.get("performing_company"),
            efficiency: row.get("efficiency"),
            times_returned: row.get("times_returned"),
            grade_for_service: row.get("grade_for_service"),
            hood: row.get("hood"),
        }
    }
}

#[async_trait]
impl RequestSource for PgRequestSource {
    async fn count_closed_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(COUNT_CLOSED_STMT)
            .bind(from)
            .bind(to)
            .fetch_one(self.client.pool())
            .await
            .map_err(|e| {
                Error::source(format!("failed to count requests by closure time: {e}"))
            })?;

        Ok(count)
    }

    async fn closed_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ServiceRequest>> {
        let rows = sqlx::query(PAGE_CLOSED_STMT)
            .bind(from)
            .bind(to)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.client.pool())
            .await
            .map_err(|e| {
                Error::source(format!("failed to get requests by closure time: {e}"))
            })?;

        Ok(rows.into_iter().map(Self::map_row).collect())
    }
}
