//! Model service health checks.

use std::time::Duration;

use tracing::{debug, error};

use crate::config::ModelConfig;

/// Check that the model service is reachable. Any HTTP response counts:
/// the probe tests reachability, not the scoring contract.
pub async fn check_connection(config: &ModelConfig) -> bool {
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build model health client: {}", e);
            return false;
        }
    };

    match client.get(&config.base_url).send().await {
        Ok(response) => {
            debug!(status = %response.status(), "Model service reachable");
            true
        }
        Err(e) => {
            error!("Model service unreachable: {}", e);
            false
        }
    }
}
