//! Client for the anomaly scoring microservice.
//!
//! The model is an external Python service scoring batches of closed
//! requests. One HTTP call per page; the mocked client stands in for the
//! service in development environments.

pub mod client;
pub mod config;
pub mod dto;
pub mod health;
pub mod mock;

pub use client::{HttpPredictionClient, PredictionClient};
pub use config::ModelConfig;
pub use mock::MockPredictionClient;
