//! Anomaly verdicts produced by the scoring model.

use serde::{Deserialize, Serialize};

/// Scoring result for one request. Persisted as a pure overwrite keyed by
/// `root_id`, so re-scoring the same request is idempotent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyVerdict {
    pub root_id: String,
    pub is_anomaly: bool,
    /// Anomaly case codes assigned by the model. Empty when not anomalous.
    pub anomaly_cases: Vec<i32>,
    /// Net probability from the combined model, when the model reports one.
    pub net_probability: Option<f32>,
}

impl AnomalyVerdict {
    /// A non-anomalous verdict with no case codes.
    pub fn clean(root_id: impl Into<String>) -> Self {
        Self {
            root_id: root_id.into(),
            is_anomaly: false,
            anomaly_cases: Vec::new(),
            net_probability: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_verdict_has_no_cases() {
        let v = AnomalyVerdict::clean("root-1");
        assert_eq!(v.root_id, "root-1");
        assert!(!v.is_anomaly);
        assert!(v.anomaly_cases.is_empty());
        assert!(v.net_probability.is_none());
    }
}
