//! Unified error types for the anomaly enrichment engine.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the anomaly enrichment engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Checkpoint row read/write failure. Fatal to the current trigger.
    #[error("checkpoint error: {0}")]
    Checkpoint(String),

    /// Request source read failure during the paging loop.
    #[error("request source error: {0}")]
    Source(String),

    /// Prediction service transport failure or non-2xx response.
    #[error("prediction error{}: {message}", .status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    Prediction {
        status: Option<u16>,
        message: String,
    },

    /// Anomaly store write failure.
    #[error("anomaly store error: {0}")]
    Store(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn checkpoint(msg: impl Into<String>) -> Self {
        Self::Checkpoint(msg.into())
    }

    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Create a prediction error without an HTTP status (transport failure).
    pub fn prediction(msg: impl Into<String>) -> Self {
        Self::Prediction {
            status: None,
            message: msg.into(),
        }
    }

    /// Create a prediction error carrying the upstream HTTP status.
    pub fn prediction_status(status: u16, msg: impl Into<String>) -> Self {
        Self::Prediction {
            status: Some(status),
            message: msg.into(),
        }
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prediction_error_includes_status_when_present() {
        let err = Error::prediction_status(502, "bad gateway from model service");
        assert_eq!(
            err.to_string(),
            "prediction error (status 502): bad gateway from model service"
        );

        let err = Error::prediction("connection refused");
        assert_eq!(err.to_string(), "prediction error: connection refused");
    }
}
