//! Resampling 1-minute bars into coarser calendar-aligned timeframes.

use barquet_types::{Bar, Timeframe};

/// Resamples an ordered, deduplicated 1-minute bar series into `target`.
///
/// Bars are grouped into fixed UTC calendar windows (an hour bar covers
/// minute 0 to 59 of that hour, a daily bar starts at 00:00 UTC). For each
/// non-empty window the output bar takes the first contained open, the
/// max high, the min low, the last contained close, and the summed volume.
/// Windows containing no input bars are omitted, consistent with the
/// sparse minute series.
///
/// The function is pure: resampling the same input twice yields identical
/// output, and `target == Minute1` returns the input unchanged.
#[must_use]
pub fn resample(minute_bars: &[Bar], target: Timeframe) -> Vec<Bar> {
    if target.is_base() {
        return minute_bars.to_vec();
    }

    let mut out = Vec::new();
    let mut current: Option<Bar> = None;

    for bar in minute_bars {
        let window = target.window_start(bar.datetime);

        match current.as_mut() {
            Some(acc) if acc.datetime == window => {
                acc.high = acc.high.max(bar.high);
                acc.low = acc.low.min(bar.low);
                acc.close = bar.close;
                acc.volume += bar.volume;
            }
            Some(acc) => {
                out.push(*acc);
                current = Some(window_bar(window, bar));
            }
            None => {
                current = Some(window_bar(window, bar));
            }
        }
    }

    out.extend(current);
    out
}

/// Opens a window bar from its first contained minute bar.
const fn window_bar(window: chrono::DateTime<chrono::Utc>, bar: &Bar) -> Bar {
    Bar::new(window, bar.open, bar.high, bar.low, bar.close, bar.volume)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeDelta, TimeZone, Timelike, Utc};

    fn minute_bar(hour: u32, minute: u32, base: f64) -> Bar {
        let datetime = Utc.with_ymd_and_hms(2024, 3, 5, hour, minute, 0).unwrap();
        Bar::new(
            datetime,
            base,
            base + 0.0010,
            base - 0.0010,
            base + 0.0005,
            2.0,
        )
    }

    #[test]
    fn test_hour_resample_over_full_hour() {
        let bars: Vec<_> = (0..60)
            .map(|m| minute_bar(9, m, 1.1000 + f64::from(m) * 1e-4))
            .collect();

        let hourly = resample(&bars, Timeframe::Hour1);
        assert_eq!(hourly.len(), 1);

        let bar = hourly[0];
        assert_eq!(bar.datetime.hour(), 9);
        assert_eq!(bar.datetime.minute(), 0);
        assert_relative_eq!(bar.open, bars[0].open);
        assert_relative_eq!(bar.close, bars[59].close);
        assert_relative_eq!(
            bar.high,
            bars.iter().map(|b| b.high).fold(f64::MIN, f64::max)
        );
        assert_relative_eq!(bar.low, bars.iter().map(|b| b.low).fold(f64::MAX, f64::min));
        assert_relative_eq!(bar.volume, 120.0);
    }

    #[test]
    fn test_five_minute_grouping() {
        let bars = vec![
            minute_bar(9, 0, 1.1000),
            minute_bar(9, 3, 1.1010),
            minute_bar(9, 5, 1.1020),
            minute_bar(9, 7, 1.1030),
        ];

        let resampled = resample(&bars, Timeframe::Minute5);
        assert_eq!(resampled.len(), 2);
        assert_eq!(resampled[0].datetime.minute(), 0);
        assert_eq!(resampled[1].datetime.minute(), 5);
        assert_relative_eq!(resampled[0].open, 1.1000);
        assert_relative_eq!(resampled[0].close, 1.1010 + 0.0005);
        assert_relative_eq!(resampled[1].volume, 4.0);
    }

    #[test]
    fn test_empty_windows_are_omitted() {
        // Minutes in hour 9 and hour 14 only; hours 10-13 must not appear.
        let bars = vec![minute_bar(9, 30, 1.1000), minute_bar(14, 2, 1.1050)];

        let hourly = resample(&bars, Timeframe::Hour1);
        assert_eq!(hourly.len(), 2);
        assert_eq!(hourly[0].datetime.hour(), 9);
        assert_eq!(hourly[1].datetime.hour(), 14);
    }

    #[test]
    fn test_daily_window_alignment() {
        let mut bars = vec![minute_bar(9, 0, 1.1000), minute_bar(23, 59, 1.1020)];
        // A bar on the next day opens a second daily window.
        let next_day = minute_bar(0, 5, 1.1040);
        bars.push(Bar::new(
            next_day.datetime + TimeDelta::days(1),
            next_day.open,
            next_day.high,
            next_day.low,
            next_day.close,
            next_day.volume,
        ));

        let daily = resample(&bars, Timeframe::Day1);
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].datetime.hour(), 0);
        assert_relative_eq!(daily[0].open, 1.1000);
        assert_relative_eq!(daily[0].close, 1.1020 + 0.0005);
    }

    #[test]
    fn test_base_timeframe_is_identity() {
        let bars = vec![minute_bar(9, 0, 1.1000), minute_bar(9, 1, 1.1010)];
        assert_eq!(resample(&bars, Timeframe::Minute1), bars);
    }

    #[test]
    fn test_resample_is_idempotent() {
        let bars: Vec<_> = (0..120u32)
            .map(|m| minute_bar(9 + m / 60, m % 60, 1.1000 + f64::from(m) * 1e-5))
            .collect();

        let once = resample(&bars, Timeframe::Minute15);
        let twice = resample(&bars, Timeframe::Minute15);
        assert_eq!(once, twice);
    }
}
