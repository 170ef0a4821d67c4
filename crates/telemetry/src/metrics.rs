//! In-memory run metrics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Collected metrics for the enrichment job.
#[derive(Debug, Default)]
pub struct Metrics {
    /// Pipeline executions that acquired the job.
    pub runs_started: Counter,
    /// Runs that advanced the watermark.
    pub runs_completed: Counter,
    /// Runs that finalized without advancing the watermark.
    pub runs_failed: Counter,
    /// Invocations short-circuited by an active previous run.
    pub runs_already_active: Counter,

    pub pages_processed: Counter,
    pub requests_scored: Counter,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            runs_started: self.runs_started.get(),
            runs_completed: self.runs_completed.get(),
            runs_failed: self.runs_failed.get(),
            runs_already_active: self.runs_already_active.get(),
            pages_processed: self.pages_processed.get(),
            requests_scored: self.requests_scored.get(),
        }
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub runs_started: u64,
    pub runs_completed: u64,
    pub runs_failed: u64,
    pub runs_already_active: u64,
    pub pages_processed: u64,
    pub requests_scored: u64,
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let m = Metrics::new();
        m.runs_started.inc();
        m.requests_scored.inc_by(20000);
        m.requests_scored.inc_by(5000);

        let snapshot = m.snapshot();
        assert_eq!(snapshot.runs_started, 1);
        assert_eq!(snapshot.requests_scored, 25000);
    }
}
