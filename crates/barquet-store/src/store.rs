//! The partition store: incremental merge writes and selective reads.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use barquet_types::{Bar, BarquetError, DateRangeError, MonthIterator, NaiveBar, Result, Timeframe};

use crate::{PartitionKey, codec};

/// Outcome of one `write_bars` call.
///
/// Failures are isolated per partition: a corrupt existing file fails
/// only that partition's merge, and the rest of the call proceeds.
#[derive(Debug, Default)]
pub struct WriteReport {
    /// Total bars present in the partitions written (after merge).
    pub bars_written: usize,
    /// Number of partition files replaced.
    pub partitions_written: usize,
    /// Partitions whose merge failed.
    pub failures: Vec<PartitionFailure>,
}

impl WriteReport {
    /// Returns true if every touched partition was written.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A single partition merge that failed.
#[derive(Debug)]
pub struct PartitionFailure {
    /// The partition that failed.
    pub key: PartitionKey,
    /// Path of the partition file.
    pub path: PathBuf,
    /// Why the merge failed.
    pub reason: String,
}

/// Owns the on-disk partition tree.
///
/// All access to partition files goes through this type; callers never
/// touch the tree directly, which is what upholds the atomic-replace and
/// partition-isolation invariants. One writer per partition key per
/// process is assumed; cross-process writers are out of scope.
#[derive(Debug, Clone)]
pub struct PartitionStore {
    root: PathBuf,
}

impl PartitionStore {
    /// Creates a store rooted at `root`. The directory is created lazily
    /// on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the tree root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Merges `new_bars` into the partitions they belong to.
    ///
    /// Bars are grouped by [`PartitionKey`]; for each key touched the
    /// existing partition (if any) is loaded, the union is deduplicated
    /// by datetime with new bars winning on collision, sorted ascending,
    /// and written back via temp-file-then-rename so readers never see a
    /// partial file. Partitions whose key is not touched are never
    /// opened.
    ///
    /// # Errors
    ///
    /// Only infallible-input errors surface here; per-partition failures
    /// are reported in the [`WriteReport`] instead.
    pub fn write_bars(
        &self,
        asset: &str,
        timeframe: Timeframe,
        new_bars: &[Bar],
    ) -> Result<WriteReport> {
        let mut by_key: BTreeMap<PartitionKey, Vec<Bar>> = BTreeMap::new();
        for bar in new_bars {
            by_key
                .entry(PartitionKey::for_datetime(asset, timeframe, bar.datetime))
                .or_default()
                .push(*bar);
        }

        let mut report = WriteReport::default();
        for (key, bars) in by_key {
            let path = key.path(&self.root);
            match self.merge_partition(&path, &bars) {
                Ok(total) => {
                    report.bars_written += total;
                    report.partitions_written += 1;
                    debug!(%key, total, "partition written");
                }
                Err(e) => {
                    warn!(%key, path = %path.display(), "partition write failed: {e}");
                    report.failures.push(PartitionFailure {
                        key,
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(report)
    }

    /// Merges one partition and atomically replaces its file.
    fn merge_partition(&self, path: &Path, new_bars: &[Bar]) -> Result<usize> {
        let existing = if path.exists() {
            codec::read_bars(path).map_err(|e| BarquetError::CorruptPartition {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
        } else {
            Vec::new()
        };

        // Dedup by datetime, new bar wins, ascending order.
        let mut merged: BTreeMap<DateTime<Utc>, Bar> = BTreeMap::new();
        for bar in existing.iter().chain(new_bars) {
            merged.insert(bar.datetime, *bar);
        }
        let merged: Vec<Bar> = merged.into_values().collect();

        let dir = path.parent().expect("partition path has a parent");
        std::fs::create_dir_all(dir)?;

        let mut temp = NamedTempFile::new_in(dir)?;
        codec::write_bars(&merged, &mut temp)?;
        temp.persist(path)
            .map_err(|e| BarquetError::Io(e.error))?;

        Ok(merged.len())
    }

    /// Reads all bars with datetimes in `[start, end]`, ascending.
    ///
    /// Resolves the minimal set of partitions whose month intersects the
    /// range and opens exactly those; months wholly outside the range are
    /// never touched. A series that does not exist yet yields an empty
    /// result, not an error.
    ///
    /// # Errors
    ///
    /// Returns `InvalidReadRange` (before any I/O) if `end < start`, or
    /// `CorruptPartition` if a resolved partition cannot be decoded.
    pub fn read_bars(
        &self,
        asset: &str,
        timeframe: Timeframe,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>> {
        if end < start {
            return Err(DateRangeError::InvalidReadRange { start, end }.into());
        }

        let series_dir = PartitionKey::series_dir(&self.root, asset, timeframe);
        if !series_dir.exists() {
            return Ok(Vec::new());
        }

        let mut bars = Vec::new();
        for (year, month) in MonthIterator::from_timestamps(start, end) {
            let path = PartitionKey::new(asset, timeframe, year, month).path(&self.root);
            if !path.exists() {
                continue;
            }
            let partition =
                codec::read_bars(&path).map_err(|e| BarquetError::CorruptPartition {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
            bars.extend(
                partition
                    .into_iter()
                    .filter(|b| b.datetime >= start && b.datetime <= end),
            );
        }

        // Partition files are individually sorted and months are visited
        // ascending, so this is a no-op unless an external writer broke
        // the layout.
        bars.sort_by_key(|b| b.datetime);
        Ok(bars)
    }

    /// Reads bars like [`Self::read_bars`] and strips the UTC timezone
    /// metadata for downstream consumers.
    ///
    /// # Errors
    ///
    /// Same as [`Self::read_bars`].
    pub fn read_bars_naive(
        &self,
        asset: &str,
        timeframe: Timeframe,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<NaiveBar>> {
        Ok(self
            .read_bars(asset, timeframe, start, end)?
            .into_iter()
            .map(NaiveBar::from)
            .collect())
    }

    /// Returns the datetime of the newest stored bar for a series, or
    /// `None` if no partition exists yet.
    ///
    /// Only the newest month's partition is opened.
    ///
    /// # Errors
    ///
    /// Returns `CorruptPartition` if the newest partition cannot be
    /// decoded.
    pub fn last_timestamp(
        &self,
        asset: &str,
        timeframe: Timeframe,
    ) -> Result<Option<DateTime<Utc>>> {
        let series_dir = PartitionKey::series_dir(&self.root, asset, timeframe);

        let Some(year_dir) = newest_subdir(&series_dir, "year=")? else {
            return Ok(None);
        };
        let Some(month_dir) = newest_subdir(&year_dir, "month=")? else {
            return Ok(None);
        };

        let path = month_dir.join(PartitionKey::FILE_NAME);
        if !path.exists() {
            return Ok(None);
        }

        let bars = codec::read_bars(&path).map_err(|e| BarquetError::CorruptPartition {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Ok(bars.iter().map(|b| b.datetime).max())
    }
}

/// Returns the lexicographically last subdirectory with the given prefix.
///
/// Partition path components are zero-padded, so lexicographic order is
/// chronological order.
fn newest_subdir(dir: &Path, prefix: &str) -> Result<Option<PathBuf>> {
    if !dir.exists() {
        return Ok(None);
    }

    let mut subdirs: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(std::io::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_dir()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(prefix))
        })
        .collect();
    subdirs.sort();
    Ok(subdirs.pop())
}
