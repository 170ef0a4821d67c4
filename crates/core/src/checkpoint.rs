//! Checkpoint state and per-run reporting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The singleton job checkpoint: the watermark up to which requests have
/// been scored, and the mutual-exclusion flag. At most one run holds
/// `active = true`; both fields move atomically per transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CheckpointState {
    /// Closure-time boundary already covered by a successful run.
    pub watermark: DateTime<Utc>,
    /// Whether an enrichment run currently holds the job.
    pub active: bool,
}

/// In-memory outcome of one pipeline execution. Not persisted; the only
/// durable effect of a run is whether the watermark advanced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub total_count: i64,
    pub pages_processed: u32,
    pub failed: bool,
}

impl RunReport {
    pub fn new(window_start: DateTime<Utc>, window_end: DateTime<Utc>) -> Self {
        Self {
            window_start,
            window_end,
            total_count: 0,
            pages_processed: 0,
            failed: false,
        }
    }

    /// The watermark to persist at finalization: the window end on full
    /// success, nothing on failure.
    pub fn new_watermark(&self) -> Option<DateTime<Utc>> {
        if self.failed {
            None
        } else {
            Some(self.window_end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn failed_run_does_not_advance_watermark() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();

        let mut report = RunReport::new(start, end);
        assert_eq!(report.new_watermark(), Some(end));

        report.failed = true;
        assert_eq!(report.new_watermark(), None);
    }
}
