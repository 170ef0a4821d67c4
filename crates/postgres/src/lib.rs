//! Postgres access layer for the anomaly enrichment engine.
//!
//! Exposes the three collaborator seams the pipeline consumes:
//! - [`CheckpointStore`] - the job watermark and mutual-exclusion flag
//! - [`RequestSource`] - read-only closed-request pages
//! - [`AnomalyStore`] - transactional verdict upserts

pub mod anomalies;
pub mod checkpoint;
pub mod client;
pub mod config;
pub mod health;
pub mod requests;
pub mod schema;

pub use anomalies::{AnomalyStore, PgAnomalyStore};
pub use checkpoint::{CheckpointStore, PgCheckpointStore};
pub use client::PostgresClient;
pub use config::PostgresConfig;
pub use requests::{PgRequestSource, RequestSource};
