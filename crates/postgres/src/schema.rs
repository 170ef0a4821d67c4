//! Schema DDL for the tables this service owns.
//!
//! The `requests` table belongs to the upstream dataset loader and is never
//! created here; this service only provisions its own checkpoint row and the
//! verdict table.

/// Name of the singleton enrichment job row.
pub const JOB_NAME: &str = "anomaly_job";

/// DDL for service-owned tables.
pub fn all_tables() -> Vec<&'static str> {
    vec![
        r#"
        CREATE TABLE IF NOT EXISTS anomaly_check_job (
            name       text PRIMARY KEY,
            ts         timestamptz NOT NULL,
            is_active  boolean NOT NULL DEFAULT false
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS requests_anomalies (
            root_id          text PRIMARY KEY,
            is_anomaly       boolean NOT NULL,
            anomaly_cases    integer[] NOT NULL DEFAULT '{}',
            net_probability  real
        )
        "#,
    ]
}

/// Seed for the checkpoint row. The watermark starts at the epoch so the
/// first run covers the whole dataset; a no-op if the row already exists.
pub fn seed_checkpoint() -> &'static str {
    r#"
    INSERT INTO anomaly_check_job (name, ts, is_active)
    VALUES ($1, to_timestamp(0), false)
    ON CONFLICT (name) DO NOTHING
    "#
}
