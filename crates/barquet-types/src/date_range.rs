//! Date range, hour iteration, and calendar-month iteration.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};

use crate::DateRangeError;

/// A range of dates for an update run or a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// Start date (inclusive).
    pub start: NaiveDate,
    /// End date (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a new date range, validating that start <= end.
    ///
    /// # Errors
    ///
    /// Returns an error if start > end. Validation happens before any I/O.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateRangeError> {
        if start > end {
            return Err(DateRangeError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates a date range for a single day.
    #[must_use]
    pub const fn single_day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Returns an iterator over all hour starts in the range, ascending.
    pub fn hours(&self) -> HourIterator {
        HourIterator::new(self.start, self.end)
    }

    /// Returns the total number of hours in the range.
    #[must_use]
    pub fn total_hours(&self) -> usize {
        let days = (self.end - self.start).num_days() + 1;
        (days * 24) as usize
    }

    /// Returns the UTC timestamp of the first hour in the range.
    #[must_use]
    pub fn start_utc(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.start.and_time(NaiveTime::MIN))
    }

    /// Returns the UTC timestamp of the last second in the range.
    #[must_use]
    pub fn end_utc(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.end.and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap()))
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Iterator over all hour starts in a date range.
#[derive(Debug, Clone)]
pub struct HourIterator {
    current: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl HourIterator {
    fn new(start: NaiveDate, end: NaiveDate) -> Self {
        let start_dt = Utc.from_utc_datetime(&start.and_time(NaiveTime::MIN));
        // Last hour of the end date
        let end_dt =
            Utc.from_utc_datetime(&end.and_time(NaiveTime::from_hms_opt(23, 0, 0).unwrap()));

        Self {
            current: start_dt,
            end: end_dt,
        }
    }

    /// Starts iteration at the given hour instead of the range start.
    ///
    /// Used for resume-from-latest: `from` is truncated to its hour start.
    #[must_use]
    pub fn starting_at(mut self, from: DateTime<Utc>) -> Self {
        let hour = from
            .with_minute(0)
            .and_then(|dt| dt.with_second(0))
            .and_then(|dt| dt.with_nanosecond(0))
            .unwrap_or(from);
        if hour > self.current {
            self.current = hour;
        }
        self
    }
}

impl Iterator for HourIterator {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current > self.end {
            return None;
        }

        let result = self.current;
        self.current += chrono::TimeDelta::hours(1);
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.current > self.end {
            return (0, Some(0));
        }
        let hours = (self.end - self.current).num_hours() as usize + 1;
        (hours, Some(hours))
    }
}

impl ExactSizeIterator for HourIterator {}

/// Iterator over the calendar months a range intersects, ascending.
///
/// Yields `(year, month)` pairs. This drives selective partition
/// resolution: only the months yielded here may be opened for a read or
/// touched by a merge.
#[derive(Debug, Clone)]
pub struct MonthIterator {
    year: i32,
    month: u32,
    end_year: i32,
    end_month: u32,
    done: bool,
}

impl MonthIterator {
    fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            year: start.year(),
            month: start.month(),
            end_year: end.year(),
            end_month: end.month(),
            done: start > end,
        }
    }

    /// Creates a month iterator from UTC timestamps.
    #[must_use]
    pub fn from_timestamps(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::new(start.date_naive(), end.date_naive())
    }
}

impl Iterator for MonthIterator {
    type Item = (i32, u32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = (self.year, self.month);
        if self.year == self.end_year && self.month == self.end_month {
            self.done = true;
        } else if self.month == 12 {
            self.year += 1;
            self.month = 1;
        } else {
            self.month += 1;
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_range_new() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let range = DateRange::new(start, end).unwrap();

        assert_eq!(range.start, start);
        assert_eq!(range.end, end);
    }

    #[test]
    fn test_date_range_invalid() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(DateRange::new(start, end).is_err());
    }

    #[test]
    fn test_total_hours() {
        let range = DateRange::single_day(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(range.total_hours(), 24);
    }

    #[test]
    fn test_hour_iterator() {
        let range = DateRange::single_day(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let hours: Vec<_> = range.hours().collect();

        assert_eq!(hours.len(), 24);
        assert_eq!(hours[0].hour(), 0);
        assert_eq!(hours[23].hour(), 23);
    }

    #[test]
    fn test_hour_iterator_starting_at() {
        let range = DateRange::single_day(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let from = Utc.with_ymd_and_hms(2024, 1, 1, 20, 15, 30).unwrap();
        let hours: Vec<_> = range.hours().starting_at(from).collect();

        assert_eq!(hours.len(), 4);
        assert_eq!(hours[0].hour(), 20);
        assert_eq!(hours[0].minute(), 0);
    }

    #[test]
    fn test_month_iterator_within_year() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 2, 15).unwrap(),
            NaiveDate::from_ymd_opt(2024, 4, 3).unwrap(),
        )
        .unwrap();
        let months: Vec<_> =
            MonthIterator::from_timestamps(range.start_utc(), range.end_utc()).collect();
        assert_eq!(months, vec![(2024, 2), (2024, 3), (2024, 4)]);
    }

    #[test]
    fn test_month_iterator_across_year() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2023, 11, 20).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        )
        .unwrap();
        let months: Vec<_> =
            MonthIterator::from_timestamps(range.start_utc(), range.end_utc()).collect();
        assert_eq!(months, vec![(2023, 11), (2023, 12), (2024, 1), (2024, 2)]);
    }

    #[test]
    fn test_month_iterator_single_month() {
        let range = DateRange::single_day(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        let months: Vec<_> =
            MonthIterator::from_timestamps(range.start_utc(), range.end_utc()).collect();
        assert_eq!(months, vec![(2024, 6)]);
    }
}
