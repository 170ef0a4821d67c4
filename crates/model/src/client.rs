//! HTTP prediction client.

use std::time::Duration;

use anomaly_core::{AnomalyVerdict, Error, Result, ServiceRequest};
use async_trait::async_trait;
use tracing::debug;

use crate::config::ModelConfig;
use crate::dto::PredictionDto;

#[async_trait]
pub trait PredictionClient: Send + Sync {
    /// Score a batch of requests in one call. Returns one verdict per input
    /// record; fails on transport errors or a non-2xx response.
    async fn score(&self, batch: &[ServiceRequest]) -> Result<Vec<AnomalyVerdict>>;
}

/// Client for the model microservice over HTTP.
pub struct HttpPredictionClient {
    http: reqwest::Client,
    config: ModelConfig,
}

impl HttpPredictionClient {
    pub fn new(config: ModelConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }
}

#[async_trait]
impl PredictionClient for HttpPredictionClient {
    async fn score(&self, batch: &[ServiceRequest]) -> Result<Vec<AnomalyVerdict>> {
        let response = self
            .http
            .post(self.config.predict_url())
            .json(batch)
            .send()
            .await
            .map_err(|e| {
                Error::prediction(format!("failed to reach model service: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::prediction_status(
                status.as_u16(),
                format!("model service rejected batch: {body}"),
            ));
        }

        let predictions: Vec<PredictionDto> = response.json().await.map_err(|e| {
            Error::prediction(format!("failed to decode model response: {e}"))
        })?;

        debug!(
            batch = batch.len(),
            predictions = predictions.len(),
            "Scored request batch"
        );

        Ok(predictions.into_iter().map(AnomalyVerdict::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::post;
    use axum::{Json, Router};
    use chrono::Utc;

    fn request(root_id: &str) -> ServiceRequest {
        ServiceRequest {
            root_id: root_id.to_string(),
            closure_date: Utc::now(),
            date_of_creation: Utc::now(),
            date_of_previous_request_close: None,
            deffect_category_id: Some(3),
            deffect_category_name: Some("Plumbing".to_string()),
            work_type_done: None,
            urgency_category: Some("normal".to_string()),
            owner_company: None,
            serving_company: None,
            performing_company: None,
            efficiency: None,
            times_returned: Some(0),
            grade_for_service: None,
            hood: None,
        }
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn score_posts_batch_and_maps_verdicts() {
        let app = Router::new().route(
            "/combined_model/predict_multiple",
            post(|Json(batch): Json<Vec<ServiceRequest>>| async move {
                let verdicts: Vec<PredictionDto> = batch
                    .iter()
                    .map(|r| PredictionDto {
                        root_id: r.root_id.clone(),
                        is_anomaly: r.root_id == "bad",
                        anomaly_cases: if r.root_id == "bad" { vec![2] } else { vec![] },
                        net_probability: None,
                    })
                    .collect();
                Json(verdicts)
            }),
        );

        let base_url = serve(app).await;
        let client = HttpPredictionClient::new(ModelConfig {
            base_url,
            ..ModelConfig::default()
        })
        .unwrap();

        let verdicts = client
            .score(&[request("ok"), request("bad")])
            .await
            .expect("score succeeds");

        assert_eq!(verdicts.len(), 2);
        let bad = verdicts.iter().find(|v| v.root_id == "bad").unwrap();
        assert!(bad.is_anomaly);
        assert_eq!(bad.anomaly_cases, vec![2]);
    }

    #[tokio::test]
    async fn non_2xx_response_is_a_prediction_error() {
        let app = Router::new().route(
            "/combined_model/predict_multiple",
            post(|| async { (axum::http::StatusCode::BAD_GATEWAY, "model down") }),
        );

        let base_url = serve(app).await;
        let client = HttpPredictionClient::new(ModelConfig {
            base_url,
            ..ModelConfig::default()
        })
        .unwrap();

        let err = client.score(&[request("r")]).await.unwrap_err();
        match err {
            Error::Prediction { status, .. } => assert_eq!(status, Some(502)),
            other => panic!("expected prediction error, got {other:?}"),
        }
    }
}
