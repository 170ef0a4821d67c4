//! Daily job scheduler.
//!
//! Fires the enrichment pipeline on a cron spec evaluated in the business
//! timezone. An overlapping previous run is the only retryable condition:
//! it is retried within the same trigger with Fibonacci backoff, bounded by
//! a fixed attempt budget. Internal pipeline failures are terminal for the
//! trigger; the unadvanced watermark is their retry mechanism.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anomaly_core::{Error, Result};
use chrono::Utc;
use chrono_tz::Tz;
use cron::Schedule;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::backoff::retry_delay;
use crate::enrichment::{EnrichmentPipeline, DEFAULT_PAGE_SIZE};

/// Enrichment job configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Cron spec (with seconds field) for the daily trigger
    #[serde(default = "default_time_spec")]
    pub time_spec: String,
    /// Named timezone the cron spec is evaluated in. Business-day batch
    /// semantics, so a fixed named zone rather than UTC.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Attempt budget per trigger when the previous run is still active
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Requests per page
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_time_spec() -> String {
    // 03:00 daily, before the morning dashboard traffic.
    "0 0 3 * * *".to_string()
}

fn default_timezone() -> String {
    "Europe/Moscow".to_string()
}

fn default_max_attempts() -> u32 {
    5
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            time_spec: default_time_spec(),
            timezone: default_timezone(),
            max_attempts: default_max_attempts(),
            page_size: default_page_size(),
        }
    }
}

/// Background scheduler for the enrichment job.
pub struct JobScheduler {
    config: SchedulerConfig,
    pipeline: Arc<EnrichmentPipeline>,
}

impl JobScheduler {
    pub fn new(config: SchedulerConfig, pipeline: Arc<EnrichmentPipeline>) -> Self {
        Self { config, pipeline }
    }

    /// Validates the schedule and spawns the trigger loop on a worker task,
    /// leaving request-serving capacity untouched.
    pub fn start(self) -> Result<tokio::task::JoinHandle<()>> {
        let schedule = Schedule::from_str(&self.config.time_spec)
            .map_err(|e| Error::config(format!("invalid cron spec: {e}")))?;
        let tz: Tz = self
            .config
            .timezone
            .parse()
            .map_err(|e| Error::config(format!("invalid timezone: {e}")))?;

        info!(
            time_spec = %self.config.time_spec,
            timezone = %self.config.timezone,
            "Registered enrichment job"
        );

        let max_attempts = self.config.max_attempts;
        let pipeline = self.pipeline;

        Ok(tokio::spawn(async move {
            loop {
                let now = Utc::now().with_timezone(&tz);
                let next = match schedule.after(&now).next() {
                    Some(next) => next,
                    None => {
                        error!("Cron schedule yields no future trigger, stopping");
                        return;
                    }
                };

                let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
                info!(next = %next, "Next enrichment trigger scheduled");
                tokio::time::sleep(wait).await;

                info!("Running scheduled enrichment job");
                let attempts = run_with_retry(&pipeline, max_attempts).await;
                info!(attempts, "Finished scheduled enrichment job");
            }
        }))
    }
}

/// One trigger: invoke the pipeline, retrying only the already-active
/// signal. After failed attempt `k` the delay is `fibonacci(k + 1)` minutes;
/// once the budget is spent the trigger gives up and the next scheduled
/// trigger tries again independently. Returns the number of attempts made.
pub async fn run_with_retry(pipeline: &EnrichmentPipeline, max_attempts: u32) -> u32 {
    for attempt in 1..=max_attempts {
        let already_active = pipeline.run().await;

        if !already_active {
            return attempt;
        }

        if attempt == max_attempts {
            error!(
                attempts = max_attempts,
                "Previous enrichment run still active, giving up until next trigger"
            );
            return attempt;
        }

        let delay = retry_delay(attempt);
        info!(
            attempt,
            delay_secs = delay.as_secs(),
            "Job is already active, retrying after backoff"
        );
        tokio::time::sleep(delay).await;
    }

    max_attempts
}
