//! Wire shapes for the model service.

use anomaly_core::AnomalyVerdict;
use serde::{Deserialize, Serialize};

/// One verdict as returned by the model service. Matched to inputs by
/// `root_id`, not by position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionDto {
    pub root_id: String,
    pub is_anomaly: bool,
    #[serde(default)]
    pub anomaly_cases: Vec<i32>,
    #[serde(default)]
    pub net_probability: Option<f32>,
}

impl From<PredictionDto> for AnomalyVerdict {
    fn from(dto: PredictionDto) -> Self {
        AnomalyVerdict {
            root_id: dto.root_id,
            is_anomaly: dto.is_anomaly,
            anomaly_cases: dto.anomaly_cases,
            net_probability: dto.net_probability,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prediction_deserializes_with_missing_optional_fields() {
        let dto: PredictionDto =
            serde_json::from_str(r#"{"root_id": "r-1", "is_anomaly": true}"#).unwrap();
        assert!(dto.is_anomaly);
        assert!(dto.anomaly_cases.is_empty());
        assert!(dto.net_probability.is_none());

        let verdict = AnomalyVerdict::from(dto);
        assert_eq!(verdict.root_id, "r-1");
    }
}
