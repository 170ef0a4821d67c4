//! Core domain types for the anomaly enrichment engine.

pub mod anomaly;
pub mod checkpoint;
pub mod error;
pub mod request;

pub use anomaly::AnomalyVerdict;
pub use checkpoint::{CheckpointState, RunReport};
pub use error::{Error, Result};
pub use request::ServiceRequest;
