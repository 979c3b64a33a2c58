//! Run outcome reporting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use barquet_types::Timeframe;

/// What a diagnostic records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// A tick-hour was missing or unreadable and was skipped.
    SkippedHour,
    /// A partition merge failed and was skipped.
    FailedPartition,
}

/// One skipped hour or failed partition write, kept for retry and audit.
///
/// Diagnostics are values, not log lines: callers aggregate them without
/// exception-based control flow, and a run carrying only diagnostics is
/// still a successful run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// What happened.
    pub kind: DiagnosticKind,
    /// The hour (for skips) or month start (for partition failures).
    pub timestamp_utc: DateTime<Utc>,
    /// Asset the failure belongs to.
    pub asset: String,
    /// The file or URL involved.
    pub source: String,
    /// Failure reason.
    pub reason: String,
}

impl Diagnostic {
    /// Records a skipped tick-hour.
    #[must_use]
    pub fn skipped_hour(
        hour: DateTime<Utc>,
        asset: impl Into<String>,
        source: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            kind: DiagnosticKind::SkippedHour,
            timestamp_utc: hour,
            asset: asset.into(),
            source: source.into(),
            reason: reason.into(),
        }
    }

    /// Records a failed partition merge.
    #[must_use]
    pub fn failed_partition(
        month_start: DateTime<Utc>,
        asset: impl Into<String>,
        source: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            kind: DiagnosticKind::FailedPartition,
            timestamp_utc: month_start,
            asset: asset.into(),
            source: source.into(),
            reason: reason.into(),
        }
    }
}

/// Outcome of one coordinator run.
///
/// A run that returns a report completed; structural errors (invalid
/// range, unsupported timeframe) surface as `Err` before any I/O
/// instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    /// Asset the run covered.
    pub asset: String,
    /// Bars present in the partitions written, per timeframe.
    pub bars_written: BTreeMap<Timeframe, usize>,
    /// Hours the source was asked for.
    pub hours_processed: usize,
    /// Hours skipped due to acquisition failures.
    pub hours_skipped: usize,
    /// Partition merges that failed.
    pub partitions_failed: usize,
    /// One entry per skipped hour or failed partition.
    pub diagnostics: Vec<Diagnostic>,
}

impl RunReport {
    /// Creates an empty report for an asset.
    #[must_use]
    pub fn new(asset: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            ..Self::default()
        }
    }

    /// Returns true if the run completed without any warnings.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Total bars written across all timeframes.
    #[must_use]
    pub fn total_bars_written(&self) -> usize {
        self.bars_written.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_clean_report() {
        let mut report = RunReport::new("EURUSD");
        assert!(report.is_clean());

        report.diagnostics.push(Diagnostic::skipped_hour(
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            "EURUSD",
            "a/file.bi5",
            "truncated",
        ));
        assert!(!report.is_clean());
    }

    #[test]
    fn test_total_bars_written() {
        let mut report = RunReport::new("EURUSD");
        report.bars_written.insert(Timeframe::Minute1, 120);
        report.bars_written.insert(Timeframe::Hour1, 2);
        assert_eq!(report.total_bars_written(), 122);
    }

    #[test]
    fn test_report_serializes_to_json() {
        let mut report = RunReport::new("EURUSD");
        report.bars_written.insert(Timeframe::Minute5, 24);

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"m5\":24"));
    }
}
