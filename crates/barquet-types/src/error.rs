//! Error types for barquet.

use chrono::{DateTime, NaiveDate, Utc};
use std::path::PathBuf;
use thiserror::Error;

use crate::TimeframeParseError;

/// Result type alias for barquet operations.
pub type Result<T> = std::result::Result<T, BarquetError>;

/// Errors that can occur during aggregation and storage.
///
/// Structural errors (invalid range, unsupported timeframe) abort a run
/// immediately. Per-hour and per-partition failures are absorbed as
/// diagnostics by the pipeline and never surface through this type.
#[derive(Error, Debug)]
pub enum BarquetError {
    /// Invalid date range.
    #[error(transparent)]
    DateRange(#[from] DateRangeError),

    /// Unsupported timeframe requested.
    #[error(transparent)]
    Timeframe(#[from] TimeframeParseError),

    /// An existing partition file could not be read back during a merge.
    #[error("Corrupt partition {path}: {reason}")]
    CorruptPartition {
        /// Path of the unreadable partition file.
        path: PathBuf,
        /// Decoder error message.
        reason: String,
    },

    /// Arrow/Parquet encode or decode error.
    #[error("Parquet error: {0}")]
    Parquet(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error for invalid date ranges.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    /// Start date is after end date.
    #[error("Invalid date range: {start} > {end}")]
    InvalidRange {
        /// The start date.
        start: NaiveDate,
        /// The end date.
        end: NaiveDate,
    },

    /// Read range end is before its start.
    #[error("Invalid read range: {start} > {end}")]
    InvalidReadRange {
        /// The requested start timestamp.
        start: DateTime<Utc>,
        /// The requested end timestamp.
        end: DateTime<Utc>,
    },
}
