//! Sync run reporting
//!
//! A [`SyncReport`] is the mutable accumulator threaded through one sync
//! run. Remote failures are tallied here instead of thrown, so a run always
//! completes and the scheduling layer decides from the tallies whether to
//! reschedule.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome tallies of one synchronization run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Unique identifier for this run.
    pub run_id: Uuid,
    /// The account the run was started for.
    pub account: String,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished; `None` while in flight.
    pub finished_at: Option<DateTime<Utc>>,
    /// Remote fetches that failed. Each failed stage fetch counts once.
    pub io_errors: u32,
    /// Category rows persisted.
    pub categories_synced: u32,
    /// Video rows persisted: one per distinct video stubbed in the run,
    /// plus one per detail or playback-URL replacement.
    pub videos_synced: u32,
    /// Association rows persisted.
    pub associations_synced: u32,
    /// Details documents fetched and applied.
    pub details_fetched: u32,
    /// Playback URLs resolved and applied.
    pub urls_resolved: u32,
}

impl SyncReport {
    /// Start a fresh report for `account`.
    pub fn new(account: &str) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            account: account.to_string(),
            started_at: Utc::now(),
            finished_at: None,
            io_errors: 0,
            categories_synced: 0,
            videos_synced: 0,
            associations_synced: 0,
            details_fetched: 0,
            urls_resolved: 0,
        }
    }

    /// Record one failed remote fetch.
    pub fn record_io_error(&mut self) {
        self.io_errors += 1;
    }

    /// Mark the run finished.
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Whether any remote fetch failed during the run.
    pub fn has_failures(&self) -> bool {
        self.io_errors > 0
    }

    /// Wall-clock duration in whole seconds; zero while in flight.
    pub fn duration_secs(&self) -> u64 {
        self.finished_at
            .map(|end| (end - self.started_at).num_seconds().max(0) as u64)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_report_is_clean() {
        let report = SyncReport::new("default");
        assert_eq!(report.account, "default");
        assert_eq!(report.io_errors, 0);
        assert!(!report.has_failures());
        assert!(report.finished_at.is_none());
        assert_eq!(report.duration_secs(), 0);
    }

    #[test]
    fn test_tally_and_finish() {
        let mut report = SyncReport::new("default");
        report.record_io_error();
        report.record_io_error();
        report.finish();

        assert_eq!(report.io_errors, 2);
        assert!(report.has_failures());
        assert!(report.finished_at.is_some());
    }

    #[test]
    fn test_run_ids_are_unique() {
        assert_ne!(SyncReport::new("a").run_id, SyncReport::new("a").run_id);
    }
}
