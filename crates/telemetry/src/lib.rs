//! Internal telemetry for the anomaly enrichment engine.
//!
//! The job is a background process with no user-facing surface, so failure
//! reporting happens through structured logs plus the in-memory run metrics
//! exposed on the health endpoint.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;
