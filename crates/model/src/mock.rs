//! Mocked prediction client for environments without the model service.

use anomaly_core::{AnomalyVerdict, Result, ServiceRequest};
use async_trait::async_trait;
use rand::Rng;

use crate::client::PredictionClient;

/// Case-code combinations the mocked model draws from, mirroring the
/// combined model's output space.
const MOCK_CASES: &[&[i32]] = &[
    &[1],
    &[1, 2],
    &[1, 3],
    &[1, 4],
    &[1, 5],
    &[2],
    &[2, 3],
    &[2, 4],
    &[3, 5],
    &[4, 5],
    &[5],
    &[3, 4, 5],
];

/// Stand-in for the model microservice: roughly one request in ten is
/// flagged anomalous with a random case combination.
#[derive(Default)]
pub struct MockPredictionClient;

impl MockPredictionClient {
    pub fn new() -> Self {
        Self
    }

    fn verdict(request: &ServiceRequest) -> AnomalyVerdict {
        let mut rng = rand::thread_rng();

        if rng.gen_range(0..10) != 1 {
            return AnomalyVerdict::clean(request.root_id.clone());
        }

        let cases = MOCK_CASES[rng.gen_range(0..MOCK_CASES.len())];
        AnomalyVerdict {
            root_id: request.root_id.clone(),
            is_anomaly: true,
            anomaly_cases: cases.to_vec(),
            net_probability: Some(rng.gen_range(0.5f32..1.0)),
        }
    }
}

#[async_trait]
impl PredictionClient for MockPredictionClient {
    async fn score(&self, batch: &[ServiceRequest]) -> Result<Vec<AnomalyVerdict>> {
        Ok(batch.iter().map(Self::verdict).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn request(root_id: &str) -> ServiceRequest {
        ServiceRequest {
            root_id: root_id.to_string(),
            closure_date: Utc::now(),
            date_of_creation: Utc::now(),
            date_of_previous_request_close: None,
            deffect_category_id: None,
            deffect_category_name: None,
            work_type_done: None,
            urgency_category: None,
            owner_company: None,
            serving_company: None,
            performing_company: None,
            efficiency: None,
            times_returned: None,
            grade_for_service: None,
            hood: None,
        }
    }

    #[tokio::test]
    async fn one_verdict_per_input_with_matching_ids() {
        let client = MockPredictionClient::new();
        let batch: Vec<ServiceRequest> =
            (0..50).map(|i| request(&format!("r-{i}"))).collect();

        let verdicts = client.score(&batch).await.unwrap();

        assert_eq!(verdicts.len(), batch.len());
        for (req, verdict) in batch.iter().zip(&verdicts) {
            assert_eq!(req.root_id, verdict.root_id);
            if verdict.is_anomaly {
                assert!(!verdict.anomaly_cases.is_empty());
            } else {
                assert!(verdict.anomaly_cases.is_empty());
            }
        }
    }
}
