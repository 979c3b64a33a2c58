//! The incremental update coordinator.

use chrono::{DateTime, Datelike, TimeDelta, TimeZone, Utc};
use std::collections::BTreeMap;
use tracing::{debug, info};

use barquet_aggregate::{MinuteBarBuilder, VolumePolicy, resample};
use barquet_source::{HourOutcome, TickSource};
use barquet_store::PartitionStore;
use barquet_types::{Bar, DateRange, Result, Timeframe};

use crate::{Diagnostic, RunReport};

/// Parameters of one update run.
#[derive(Debug, Clone)]
pub struct UpdateRequest {
    /// Asset to update.
    pub asset: String,
    /// Timeframes to build and store, each written independently.
    pub timeframes: Vec<Timeframe>,
    /// Date range to process, ascending.
    pub range: DateRange,
    /// How minute-bar volume is derived.
    pub volume_policy: VolumePolicy,
    /// Start from the newest stored 1-minute bar instead of the range
    /// start when the store already has newer data.
    pub resume: bool,
}

impl UpdateRequest {
    /// Creates a request with the default volume policy and no resume.
    #[must_use]
    pub const fn new(asset: String, timeframes: Vec<Timeframe>, range: DateRange) -> Self {
        Self {
            asset,
            timeframes,
            range,
            volume_policy: VolumePolicy::TickCount,
            resume: false,
        }
    }

    /// Sets the volume policy.
    #[must_use]
    pub const fn with_volume_policy(mut self, policy: VolumePolicy) -> Self {
        self.volume_policy = policy;
        self
    }

    /// Enables resume-from-latest.
    #[must_use]
    pub const fn with_resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }
}

/// Drives a full update run: acquisition, minute aggregation, resampling,
/// and partition merges, in ascending hour order.
///
/// Memory stays bounded: at most one hour of raw ticks and one calendar
/// month of minute bars are held at a time. The minute buffer is flushed
/// to every requested timeframe when the month rolls over; month
/// boundaries sit on every supported timeframe's grid, so per-month
/// resampling equals whole-range resampling.
///
/// Re-running over the same or an overlapping range is idempotent because
/// the store's dedup-and-sort merge normalizes whatever order bars arrive
/// in.
#[derive(Debug)]
pub struct UpdateCoordinator<S> {
    source: S,
    store: PartitionStore,
}

impl<S: TickSource> UpdateCoordinator<S> {
    /// Creates a coordinator over a tick source and a partition store.
    #[must_use]
    pub const fn new(source: S, store: PartitionStore) -> Self {
        Self { source, store }
    }

    /// Returns the partition store.
    #[must_use]
    pub const fn store(&self) -> &PartitionStore {
        &self.store
    }

    /// Executes one run.
    ///
    /// # Errors
    ///
    /// Only structural problems (a corrupt store probe during resume)
    /// surface as errors; skipped hours and failed partitions are
    /// absorbed into the [`RunReport`].
    pub fn run(&self, request: &UpdateRequest) -> Result<RunReport> {
        let mut timeframes: Vec<Timeframe> = Vec::with_capacity(request.timeframes.len());
        for tf in &request.timeframes {
            if !timeframes.contains(tf) {
                timeframes.push(*tf);
            }
        }

        let mut report = RunReport::new(&request.asset);
        if timeframes.is_empty() {
            return Ok(report);
        }

        let mut hours = request.range.hours();
        if request.resume
            && let Some(last) = self
                .store
                .last_timestamp(&request.asset, Timeframe::Minute1)?
        {
            debug!(asset = %request.asset, %last, "resuming from newest stored minute bar");
            hours = hours.starting_at(last);
        }

        info!(
            asset = %request.asset,
            range = %request.range,
            hours = request.range.total_hours(),
            timeframes = timeframes.len(),
            "starting update run"
        );

        // Minute bars for the month currently being processed.
        let mut buffer: Vec<Bar> = Vec::new();
        let mut current_month: Option<(i32, u32)> = None;

        for hour in hours {
            let month = (hour.year(), hour.month());
            if current_month.is_some_and(|m| m != month) {
                self.flush_month(&request.asset, &timeframes, &mut buffer, &mut report)?;
            }
            current_month = Some(month);
            report.hours_processed += 1;

            match self.source.fetch_hour(&request.asset, hour) {
                HourOutcome::Skipped { source, reason } => {
                    report.hours_skipped += 1;
                    report.diagnostics.push(Diagnostic::skipped_hour(
                        hour,
                        &request.asset,
                        source,
                        reason,
                    ));
                }
                HourOutcome::Ticks(ticks) => {
                    let mut builder = MinuteBarBuilder::with_policy(request.volume_policy);
                    for tick in ticks {
                        buffer.extend(builder.push(tick));
                    }
                    buffer.extend(builder.finish());
                }
            }
        }

        self.flush_month(&request.asset, &timeframes, &mut buffer, &mut report)?;

        info!(
            asset = %request.asset,
            bars = report.total_bars_written(),
            skipped = report.hours_skipped,
            "update run finished"
        );
        Ok(report)
    }

    /// Writes one month of minute bars to every requested timeframe.
    ///
    /// A resumed run's buffer can start mid-window (mid-day for d1,
    /// mid-block for h4), so coarse series never resample the buffer
    /// directly: they resample the full month of minute bars, stored
    /// history merged with the buffer, buffer winning on collision.
    /// Otherwise a partial window bar would replace a complete stored one.
    fn flush_month(
        &self,
        asset: &str,
        timeframes: &[Timeframe],
        buffer: &mut Vec<Bar>,
        report: &mut RunReport,
    ) -> Result<()> {
        if buffer.is_empty() {
            return Ok(());
        }

        let minutes = if timeframes.iter().any(|tf| !tf.is_base()) {
            self.month_minutes(asset, buffer)?
        } else {
            Vec::new()
        };

        for timeframe in timeframes {
            let resampled;
            let bars: &[Bar] = if timeframe.is_base() {
                buffer
            } else {
                resampled = resample(&minutes, *timeframe);
                &resampled
            };
            if bars.is_empty() {
                continue;
            }

            let written = self.store.write_bars(asset, *timeframe, bars)?;
            *report.bars_written.entry(*timeframe).or_default() += written.bars_written;

            for failure in written.failures {
                report.partitions_failed += 1;
                let month_start = Utc
                    .with_ymd_and_hms(failure.key.year, failure.key.month, 1, 0, 0, 0)
                    .single()
                    .unwrap_or_default();
                report.diagnostics.push(Diagnostic::failed_partition(
                    month_start,
                    asset,
                    failure.path.display().to_string(),
                    failure.reason,
                ));
            }
        }

        buffer.clear();
        Ok(())
    }

    /// Returns the buffered month's complete minute series: stored bars
    /// merged with the buffer, buffer winning, ascending.
    fn month_minutes(&self, asset: &str, buffer: &[Bar]) -> Result<Vec<Bar>> {
        let first = buffer[0].datetime;
        let month_start = Utc
            .with_ymd_and_hms(first.year(), first.month(), 1, 0, 0, 0)
            .unwrap();
        let (next_year, next_month) = if first.month() == 12 {
            (first.year() + 1, 1)
        } else {
            (first.year(), first.month() + 1)
        };
        let month_end = Utc
            .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
            .unwrap()
            - TimeDelta::seconds(1);

        let mut merged: BTreeMap<DateTime<Utc>, Bar> = self
            .store
            .read_bars(asset, Timeframe::Minute1, month_start, month_end)?
            .into_iter()
            .map(|bar| (bar.datetime, bar))
            .collect();
        for bar in buffer {
            merged.insert(bar.datetime, *bar);
        }
        Ok(merged.into_values().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{DateTime, NaiveDate, TimeDelta};
    use std::collections::HashMap;

    use barquet_store::PartitionKey;
    use barquet_types::Tick;

    /// In-memory tick source for pipeline tests.
    #[derive(Debug, Default)]
    struct FakeSource {
        hours: HashMap<DateTime<Utc>, HourOutcome>,
    }

    impl FakeSource {
        fn with_ticks(mut self, hour: DateTime<Utc>, ticks: Vec<Tick>) -> Self {
            self.hours.insert(hour, HourOutcome::Ticks(ticks));
            self
        }

        fn with_skip(mut self, hour: DateTime<Utc>) -> Self {
            self.hours
                .insert(hour, HourOutcome::skipped("fake://hour", "unreachable"));
            self
        }
    }

    impl TickSource for FakeSource {
        fn fetch_hour(&self, _asset: &str, hour: DateTime<Utc>) -> HourOutcome {
            self.hours
                .get(&hour)
                .cloned()
                .unwrap_or_else(|| HourOutcome::Ticks(Vec::new()))
        }
    }

    fn tick(hour: DateTime<Utc>, offset_secs: i64, bid: f64) -> Tick {
        Tick::new(
            hour + TimeDelta::seconds(offset_secs),
            bid,
            bid + 0.0001,
            1.0,
            1.0,
        )
    }

    fn day_range(year: i32, month: u32, day: u32) -> DateRange {
        DateRange::single_day(NaiveDate::from_ymd_opt(year, month, day).unwrap())
    }

    fn day_bounds(range: DateRange) -> (DateTime<Utc>, DateTime<Utc>) {
        (range.start_utc(), range.end_utc())
    }

    #[test]
    fn test_full_run_writes_minute_and_hour_bars() {
        let range = day_range(2024, 1, 10);
        let hour9 = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        let hour10 = Utc.with_ymd_and_hms(2024, 1, 10, 10, 0, 0).unwrap();

        let source = FakeSource::default()
            .with_ticks(
                hour9,
                vec![
                    tick(hour9, 0, 1.1000),
                    tick(hour9, 30, 1.1020),
                    tick(hour9, 90, 1.0990),
                ],
            )
            .with_ticks(hour10, vec![tick(hour10, 10, 1.1010)]);

        let dir = tempfile::tempdir().unwrap();
        let coordinator = UpdateCoordinator::new(source, PartitionStore::new(dir.path()));

        let request = UpdateRequest::new(
            "EURUSD".to_string(),
            vec![Timeframe::Minute1, Timeframe::Hour1],
            range,
        );
        let report = coordinator.run(&request).unwrap();

        assert!(report.is_clean());
        assert_eq!(report.hours_processed, 24);
        assert_eq!(report.bars_written[&Timeframe::Minute1], 3);
        assert_eq!(report.bars_written[&Timeframe::Hour1], 2);

        let (start, end) = day_bounds(range);
        let minutes = coordinator
            .store()
            .read_bars("EURUSD", Timeframe::Minute1, start, end)
            .unwrap();
        assert_eq!(minutes.len(), 3);
        assert_relative_eq!(minutes[0].open, 1.1000);
        assert_relative_eq!(minutes[0].close, 1.1020);
        assert_relative_eq!(minutes[0].volume, 2.0);

        let hourly = coordinator
            .store()
            .read_bars("EURUSD", Timeframe::Hour1, start, end)
            .unwrap();
        assert_eq!(hourly.len(), 2);
        assert_relative_eq!(hourly[0].open, 1.1000);
        assert_relative_eq!(hourly[0].close, 1.0990);
        assert_relative_eq!(hourly[0].volume, 3.0);
    }

    #[test]
    fn test_skipped_hour_continues_run() {
        let range = day_range(2024, 1, 10);
        let hour9 = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        let hour11 = Utc.with_ymd_and_hms(2024, 1, 10, 11, 0, 0).unwrap();

        let source = FakeSource::default()
            .with_skip(hour9)
            .with_ticks(hour11, vec![tick(hour11, 5, 1.1000)]);

        let dir = tempfile::tempdir().unwrap();
        let coordinator = UpdateCoordinator::new(source, PartitionStore::new(dir.path()));
        let request = UpdateRequest::new("EURUSD".to_string(), vec![Timeframe::Minute1], range);
        let report = coordinator.run(&request).unwrap();

        // The skip is a warning, not a failure; bars after it still land.
        assert!(!report.is_clean());
        assert_eq!(report.hours_skipped, 1);
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.bars_written[&Timeframe::Minute1], 1);
    }

    #[test]
    fn test_empty_hours_write_nothing() {
        let range = day_range(2024, 1, 10);
        let source = FakeSource::default();

        let dir = tempfile::tempdir().unwrap();
        let coordinator = UpdateCoordinator::new(source, PartitionStore::new(dir.path()));
        let request = UpdateRequest::new("EURUSD".to_string(), vec![Timeframe::Minute1], range);
        let report = coordinator.run(&request).unwrap();

        assert!(report.is_clean());
        assert!(report.bars_written.is_empty());
        let key_dir = PartitionKey::series_dir(
            coordinator.store().root(),
            "EURUSD",
            Timeframe::Minute1,
        );
        assert!(!key_dir.exists());
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let range = day_range(2024, 1, 10);
        let hour9 = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        let source = FakeSource::default().with_ticks(
            hour9,
            vec![tick(hour9, 0, 1.1000), tick(hour9, 65, 1.1010)],
        );

        let dir = tempfile::tempdir().unwrap();
        let coordinator = UpdateCoordinator::new(source, PartitionStore::new(dir.path()));
        let request = UpdateRequest::new(
            "EURUSD".to_string(),
            vec![Timeframe::Minute1, Timeframe::Hour1],
            range,
        );

        coordinator.run(&request).unwrap();
        let m1_path =
            PartitionKey::new("EURUSD", Timeframe::Minute1, 2024, 1).path(coordinator.store().root());
        let h1_path =
            PartitionKey::new("EURUSD", Timeframe::Hour1, 2024, 1).path(coordinator.store().root());
        let m1_first = std::fs::read(&m1_path).unwrap();
        let h1_first = std::fs::read(&h1_path).unwrap();

        coordinator.run(&request).unwrap();
        assert_eq!(std::fs::read(&m1_path).unwrap(), m1_first);
        assert_eq!(std::fs::read(&h1_path).unwrap(), h1_first);
    }

    #[test]
    fn test_run_spanning_months_fills_both_partitions() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        )
        .unwrap();

        let jan_hour = Utc.with_ymd_and_hms(2024, 1, 31, 23, 0, 0).unwrap();
        let feb_hour = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let source = FakeSource::default()
            .with_ticks(jan_hour, vec![tick(jan_hour, 10, 1.1000)])
            .with_ticks(feb_hour, vec![tick(feb_hour, 10, 1.1010)]);

        let dir = tempfile::tempdir().unwrap();
        let coordinator = UpdateCoordinator::new(source, PartitionStore::new(dir.path()));
        let request = UpdateRequest::new("EURUSD".to_string(), vec![Timeframe::Minute1], range);
        coordinator.run(&request).unwrap();

        let root = coordinator.store().root();
        assert!(PartitionKey::new("EURUSD", Timeframe::Minute1, 2024, 1)
            .path(root)
            .exists());
        assert!(PartitionKey::new("EURUSD", Timeframe::Minute1, 2024, 2)
            .path(root)
            .exists());
    }

    #[test]
    fn test_resume_preserves_full_daily_window() {
        let range = day_range(2024, 1, 10);
        let hour9 = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        let hour15 = Utc.with_ymd_and_hms(2024, 1, 10, 15, 0, 0).unwrap();
        let hour20 = Utc.with_ymd_and_hms(2024, 1, 10, 20, 0, 0).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let store = PartitionStore::new(dir.path());

        let seeded = UpdateCoordinator::new(
            FakeSource::default()
                .with_ticks(hour9, vec![tick(hour9, 0, 1.1000)])
                .with_ticks(hour15, vec![tick(hour15, 0, 1.2000)]),
            store.clone(),
        );
        let request = UpdateRequest::new(
            "EURUSD".to_string(),
            vec![Timeframe::Minute1, Timeframe::Day1],
            range,
        );
        seeded.run(&request).unwrap();

        // The resumed run starts mid-day; its buffer alone covers only
        // hour 20, but the daily bar must still span the whole day.
        let resumed = UpdateCoordinator::new(
            FakeSource::default().with_ticks(hour20, vec![tick(hour20, 0, 1.3000)]),
            store,
        );
        resumed.run(&request.clone().with_resume(true)).unwrap();

        let (start, end) = day_bounds(range);
        let daily = resumed
            .store()
            .read_bars("EURUSD", Timeframe::Day1, start, end)
            .unwrap();
        assert_eq!(daily.len(), 1);
        assert_relative_eq!(daily[0].open, 1.1000);
        assert_relative_eq!(daily[0].close, 1.3000);
        assert_relative_eq!(daily[0].volume, 3.0);

        let minutes = resumed
            .store()
            .read_bars("EURUSD", Timeframe::Minute1, start, end)
            .unwrap();
        assert_eq!(minutes.len(), 3);
    }

    #[test]
    fn test_resume_starts_after_stored_data() {
        let range = day_range(2024, 1, 10);
        let hour9 = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        let hour15 = Utc.with_ymd_and_hms(2024, 1, 10, 15, 0, 0).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let store = PartitionStore::new(dir.path());

        // Pre-populate the store up to 09:xx.
        let seeded = UpdateCoordinator::new(
            FakeSource::default().with_ticks(hour9, vec![tick(hour9, 0, 1.1000)]),
            store.clone(),
        );
        let request = UpdateRequest::new("EURUSD".to_string(), vec![Timeframe::Minute1], range);
        seeded.run(&request).unwrap();

        // Resumed run only fetches hours from 09:00 onward.
        let resumed = UpdateCoordinator::new(
            FakeSource::default().with_ticks(hour15, vec![tick(hour15, 0, 1.1050)]),
            store,
        );
        let report = resumed.run(&request.clone().with_resume(true)).unwrap();
        assert_eq!(report.hours_processed, 15);

        let (start, end) = day_bounds(range);
        let minutes = resumed
            .store()
            .read_bars("EURUSD", Timeframe::Minute1, start, end)
            .unwrap();
        assert_eq!(minutes.len(), 2);
    }
}
