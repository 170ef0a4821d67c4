//! Anomaly enrichment pipeline.
//!
//! One execution scores every request closed since the last successful
//! checkpoint and upserts the verdicts page by page. The checkpoint's
//! active flag serializes runs across replicas; the watermark only advances
//! when every page of the window succeeded, so a failed run is retried from
//! the same window start on the next trigger and re-upserts idempotently.

use std::sync::Arc;

use anomaly_core::RunReport;
use chrono::Utc;
use model_client::PredictionClient;
use postgres_store::{AnomalyStore, CheckpointStore, RequestSource};
use telemetry::metrics;
use tracing::{error, info};

/// Requests fetched and scored per batch.
pub const DEFAULT_PAGE_SIZE: i64 = 20000;

/// The enrichment pipeline over its four collaborators.
pub struct EnrichmentPipeline {
    checkpoint: Arc<dyn CheckpointStore>,
    requests: Arc<dyn RequestSource>,
    model: Arc<dyn PredictionClient>,
    anomalies: Arc<dyn AnomalyStore>,
    page_size: i64,
}

impl EnrichmentPipeline {
    pub fn new(
        checkpoint: Arc<dyn CheckpointStore>,
        requests: Arc<dyn RequestSource>,
        model: Arc<dyn PredictionClient>,
        anomalies: Arc<dyn AnomalyStore>,
    ) -> Self {
        Self {
            checkpoint,
            requests,
            model,
            anomalies,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.page_size = page_size;
        self
    }

    /// Execute one enrichment run.
    ///
    /// Returns `true` only when a previous run still holds the job; the
    /// scheduler retries that case with backoff. Every other outcome -
    /// success or internal failure - returns `false` and is terminal for
    /// this trigger. Internal failures surface only through logs and an
    /// unadvanced watermark.
    pub async fn run(&self) -> bool {
        let state = match self.checkpoint.state().await {
            Ok(state) => state,
            Err(e) => {
                error!(error = %e, "Failed to read checkpoint state");
                return false;
            }
        };

        if state.active {
            metrics().runs_already_active.inc();
            return true;
        }

        let window_start = match self.checkpoint.mark_active().await {
            Ok(Some(watermark)) => watermark,
            // Another replica flipped the flag between our read and the
            // conditional update; the store is the arbiter, not the read.
            Ok(None) => {
                metrics().runs_already_active.inc();
                return true;
            }
            Err(e) => {
                error!(error = %e, "Failed to mark job as active");
                return false;
            }
        };

        // The window is fixed here: requests closed from now on belong to
        // the next run, which keeps the page loop finite.
        let window_end = Utc::now();
        metrics().runs_started.inc();

        info!(
            window_start = %window_start,
            window_end = %window_end,
            "Starting enrichment run"
        );

        let mut report = RunReport::new(window_start, window_end);
        self.process_window(&mut report).await;

        // Guaranteed finalization, the sole commit point for progress: the
        // watermark advances to the window end on full success and stays
        // put on any failure.
        match self.checkpoint.mark_inactive(report.new_watermark()).await {
            Ok(watermark) => {
                if report.failed {
                    metrics().runs_failed.inc();
                    error!(
                        window_start = %report.window_start,
                        window_end = %report.window_end,
                        pages_processed = report.pages_processed,
                        "Enrichment run failed, watermark not advanced"
                    );
                } else {
                    metrics().runs_completed.inc();
                    info!(
                        watermark = %watermark,
                        total_count = report.total_count,
                        pages_processed = report.pages_processed,
                        "Enrichment run finished"
                    );
                }
            }
            Err(e) => {
                // The job may stay stuck active until operator correction;
                // accepted for an infrequent periodic job.
                error!(error = %e, "Failed to mark job as inactive");
            }
        }

        false
    }

    async fn process_window(&self, report: &mut RunReport) {
        let count = match self
            .requests
            .count_closed_between(report.window_start, report.window_end)
            .await
        {
            Ok(count) => count,
            Err(e) => {
                error!(
                    error = %e,
                    window_start = %report.window_start,
                    window_end = %report.window_end,
                    "Failed to count requests by closure time"
                );
                report.failed = true;
                return;
            }
        };

        report.total_count = count;

        if count == 0 {
            // The window was fully examined; advancing is still correct.
            info!("No newly closed requests in window");
            return;
        }

        info!(count, "Found newly closed requests");

        let pages = (count + self.page_size - 1) / self.page_size;

        for page in 0..pages {
            let offset = page * self.page_size;

            match self.process_page(report, offset).await {
                Ok(scored) => {
                    report.pages_processed += 1;
                    metrics().pages_processed.inc();
                    metrics().requests_scored.inc_by(scored as u64);
                }
                Err(e) => {
                    error!(
                        error = %e,
                        page,
                        offset,
                        window_start = %report.window_start,
                        window_end = %report.window_end,
                        "Page failed, aborting run"
                    );
                    report.failed = true;
                    break;
                }
            }
        }
    }

    async fn process_page(
        &self,
        report: &RunReport,
        offset: i64,
    ) -> anomaly_core::Result<usize> {
        let requests = self
            .requests
            .closed_between(
                report.window_start,
                report.window_end,
                self.page_size,
                offset,
            )
            .await?;

        if requests.is_empty() {
            return Ok(0);
        }

        let verdicts = self.model.score(&requests).await?;
        self.anomalies.upsert_batch(&verdicts).await?;

        Ok(verdicts.len())
    }
}
