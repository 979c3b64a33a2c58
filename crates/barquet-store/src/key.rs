//! Partition key derivation.

use chrono::{DateTime, Datelike, Utc};
use std::path::{Path, PathBuf};

use barquet_types::Timeframe;

/// Identifies one physical partition: (asset, timeframe, year, month).
///
/// The key is a pure function of a bar's datetime and the two identifying
/// strings; no external configuration participates, which is what makes
/// partition resolution deterministic across runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartitionKey {
    /// Asset identifier (e.g. `EURUSD`).
    pub asset: String,
    /// Bar series timeframe.
    pub timeframe: Timeframe,
    /// Calendar year of the partition.
    pub year: i32,
    /// Calendar month of the partition (1-12).
    pub month: u32,
}

impl PartitionKey {
    /// File name of every partition file.
    pub const FILE_NAME: &'static str = "bars.parquet";

    /// Derives the key for a bar datetime.
    #[must_use]
    pub fn for_datetime(asset: &str, timeframe: Timeframe, datetime: DateTime<Utc>) -> Self {
        Self {
            asset: asset.to_string(),
            timeframe,
            year: datetime.year(),
            month: datetime.month(),
        }
    }

    /// Creates a key from explicit parts.
    #[must_use]
    pub fn new(asset: impl Into<String>, timeframe: Timeframe, year: i32, month: u32) -> Self {
        Self {
            asset: asset.into(),
            timeframe,
            year,
            month,
        }
    }

    /// Returns the partition file path under `root`.
    ///
    /// Layout is hive-style:
    /// `root/asset=<A>/tf=<tf>/year=<yyyy>/month=<mm>/bars.parquet`.
    #[must_use]
    pub fn path(&self, root: &Path) -> PathBuf {
        root.join(format!("asset={}", self.asset))
            .join(format!("tf={}", self.timeframe))
            .join(format!("year={:04}", self.year))
            .join(format!("month={:02}", self.month))
            .join(Self::FILE_NAME)
    }

    /// Returns the directory holding all partitions of one bar series.
    #[must_use]
    pub fn series_dir(root: &Path, asset: &str, timeframe: Timeframe) -> PathBuf {
        root.join(format!("asset={asset}")).join(format!("tf={timeframe}"))
    }
}

impl std::fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{:04}-{:02}",
            self.asset, self.timeframe, self.year, self.month
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_key_for_datetime() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 15, 12, 30, 0).unwrap();
        let key = PartitionKey::for_datetime("EURUSD", Timeframe::Hour1, dt);

        assert_eq!(key.asset, "EURUSD");
        assert_eq!(key.timeframe, Timeframe::Hour1);
        assert_eq!(key.year, 2024);
        assert_eq!(key.month, 3);
    }

    #[test]
    fn test_key_path_layout() {
        let key = PartitionKey::new("EURUSD", Timeframe::Minute1, 2024, 3);
        let path = key.path(Path::new("/data"));

        assert_eq!(
            path,
            PathBuf::from("/data/asset=EURUSD/tf=m1/year=2024/month=03/bars.parquet")
        );
    }

    #[test]
    fn test_key_is_pure() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 15, 12, 30, 0).unwrap();
        let a = PartitionKey::for_datetime("EURUSD", Timeframe::Minute5, dt);
        let b = PartitionKey::for_datetime("EURUSD", Timeframe::Minute5, dt);
        assert_eq!(a, b);
    }
}
