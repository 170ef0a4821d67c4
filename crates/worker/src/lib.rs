//! Background enrichment for the anomaly engine.
//!
//! - Enrichment pipeline (checkpointed, paginated, idempotent scoring)
//! - Daily scheduler with bounded Fibonacci retry on overlap
//! - Backoff helpers

pub mod backoff;
pub mod enrichment;
pub mod scheduler;

pub use enrichment::{EnrichmentPipeline, DEFAULT_PAGE_SIZE};
pub use scheduler::{JobScheduler, SchedulerConfig};
