//! Bar series timeframe definitions.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Granularity of a bar series.
///
/// Every timeframe defines a fixed, UTC-aligned calendar grid: hours start
/// at minute 0, days start at 00:00 UTC. Windows never slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    /// 1-minute bars (the base series all others are resampled from).
    #[default]
    #[serde(rename = "m1")]
    Minute1,
    /// 5-minute bars.
    #[serde(rename = "m5")]
    Minute5,
    /// 15-minute bars.
    #[serde(rename = "m15")]
    Minute15,
    /// 30-minute bars.
    #[serde(rename = "m30")]
    Minute30,
    /// 1-hour bars.
    #[serde(rename = "h1")]
    Hour1,
    /// 4-hour bars.
    #[serde(rename = "h4")]
    Hour4,
    /// Daily bars.
    #[serde(rename = "d1")]
    Day1,
}

impl Timeframe {
    /// Returns the window duration in seconds.
    #[must_use]
    pub const fn seconds(&self) -> u64 {
        match self {
            Self::Minute1 => 60,
            Self::Minute5 => 300,
            Self::Minute15 => 900,
            Self::Minute30 => 1800,
            Self::Hour1 => 3600,
            Self::Hour4 => 14400,
            Self::Day1 => 86400,
        }
    }

    /// Returns true if this is the 1-minute base timeframe.
    #[must_use]
    pub const fn is_base(&self) -> bool {
        matches!(self, Self::Minute1)
    }

    /// Returns the timeframe as a string identifier.
    ///
    /// This identifier is also used in partition paths, so it must stay
    /// stable across releases.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Minute1 => "m1",
            Self::Minute5 => "m5",
            Self::Minute15 => "m15",
            Self::Minute30 => "m30",
            Self::Hour1 => "h1",
            Self::Hour4 => "h4",
            Self::Day1 => "d1",
        }
    }

    /// Returns all supported timeframes.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Minute1,
            Self::Minute5,
            Self::Minute15,
            Self::Minute30,
            Self::Hour1,
            Self::Hour4,
            Self::Day1,
        ]
    }

    /// Returns the start of the calendar window containing `timestamp`.
    #[must_use]
    pub fn window_start(&self, timestamp: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Minute1 => truncate_to_minutes(timestamp, 1),
            Self::Minute5 => truncate_to_minutes(timestamp, 5),
            Self::Minute15 => truncate_to_minutes(timestamp, 15),
            Self::Minute30 => truncate_to_minutes(timestamp, 30),
            Self::Hour1 => truncate_to_hours(timestamp, 1),
            Self::Hour4 => truncate_to_hours(timestamp, 4),
            Self::Day1 => truncate_to_day(timestamp),
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = TimeframeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "m1" | "1m" | "minute" | "minute1" => Ok(Self::Minute1),
            "m5" | "5m" | "minute5" => Ok(Self::Minute5),
            "m15" | "15m" | "minute15" => Ok(Self::Minute15),
            "m30" | "30m" | "minute30" => Ok(Self::Minute30),
            "h1" | "1h" | "hour" | "hour1" => Ok(Self::Hour1),
            "h4" | "4h" | "hour4" => Ok(Self::Hour4),
            "d1" | "1d" | "day" | "day1" | "daily" => Ok(Self::Day1),
            _ => Err(TimeframeParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid timeframe string.
///
/// An unsupported timeframe is a structural configuration error: it is
/// raised to the caller before any I/O happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeframeParseError(String);

impl std::fmt::Display for TimeframeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unsupported timeframe '{}', expected one of: m1, m5, m15, m30, h1, h4, d1",
            self.0
        )
    }
}

impl std::error::Error for TimeframeParseError {}

/// Truncates a timestamp to the start of a minute boundary.
fn truncate_to_minutes(dt: DateTime<Utc>, interval: u32) -> DateTime<Utc> {
    let minute = dt.minute() / interval * interval;
    Utc.with_ymd_and_hms(dt.year(), dt.month(), dt.day(), dt.hour(), minute, 0)
        .unwrap()
}

/// Truncates a timestamp to the start of an hour boundary.
fn truncate_to_hours(dt: DateTime<Utc>, interval: u32) -> DateTime<Utc> {
    let hour = dt.hour() / interval * interval;
    Utc.with_ymd_and_hms(dt.year(), dt.month(), dt.day(), hour, 0, 0)
        .unwrap()
}

/// Truncates a timestamp to the start of the day.
fn truncate_to_day(dt: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(dt.year(), dt.month(), dt.day(), 0, 0, 0)
        .unwrap()
}
