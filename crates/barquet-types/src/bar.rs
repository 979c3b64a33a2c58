//! OHLCV bar data structure.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// An OHLCV bar over one calendar window of a timeframe.
///
/// Invariants maintained by the aggregation and merge paths:
/// `low <= open, close <= high`, `volume >= 0`, and `datetime` sits
/// exactly on the timeframe's UTC calendar grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Bar open time (start of the window, UTC).
    pub datetime: DateTime<Utc>,
    /// Opening price (first tick or sub-bar in the window).
    pub open: f64,
    /// Highest price during the window.
    pub high: f64,
    /// Lowest price during the window.
    pub low: f64,
    /// Closing price (last tick or sub-bar in the window).
    pub close: f64,
    /// Volume over the window (tick count or summed feed volume).
    pub volume: f64,
}

impl Bar {
    /// Creates a new bar.
    #[must_use]
    pub const fn new(
        datetime: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            datetime,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Returns the bar open time with the UTC timezone metadata stripped.
    ///
    /// Downstream consumers receive naive-UTC timestamps; this conversion
    /// happens at the read boundary of the store.
    #[must_use]
    pub const fn naive_datetime(&self) -> NaiveDateTime {
        self.datetime.naive_utc()
    }

    /// Returns the price range (high - low).
    #[must_use]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Returns true if the OHLC fields are internally consistent.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.low <= self.open
            && self.low <= self.close
            && self.open <= self.high
            && self.close <= self.high
            && self.volume >= 0.0
    }
}

/// A bar row at the downstream read boundary.
///
/// Identical to [`Bar`] except the open time is a naive-UTC-equivalent
/// timestamp, ready for consumers that expect timezone-free tables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NaiveBar {
    /// Bar open time (naive, UTC-equivalent).
    pub datetime: NaiveDateTime,
    /// Opening price.
    pub open: f64,
    /// Highest price.
    pub high: f64,
    /// Lowest price.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Volume.
    pub volume: f64,
}

impl From<Bar> for NaiveBar {
    fn from(bar: Bar) -> Self {
        Self {
            datetime: bar.naive_datetime(),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        }
    }
}
