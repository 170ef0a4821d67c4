//! Model service configuration.

use serde::{Deserialize, Serialize};

/// Prediction service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Base URL of the model microservice
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Batch scoring endpoint
    #[serde(default = "default_predict_endpoint")]
    pub predict_endpoint: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Use the mocked client instead of the HTTP service
    #[serde(default)]
    pub mocked: bool,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_predict_endpoint() -> String {
    "/combined_model/predict_multiple".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            predict_endpoint: default_predict_endpoint(),
            timeout_secs: default_timeout_secs(),
            mocked: false,
        }
    }
}

impl ModelConfig {
    /// Full URL of the batch scoring endpoint.
    pub fn predict_url(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.predict_endpoint
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_url_joins_without_double_slash() {
        let config = ModelConfig {
            base_url: "http://model:8000/".to_string(),
            ..ModelConfig::default()
        };
        assert_eq!(
            config.predict_url(),
            "http://model:8000/combined_model/predict_multiple"
        );
    }
}
