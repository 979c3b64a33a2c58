//! Streaming tick-to-minute-bar aggregation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use barquet_types::{Bar, Tick, Timeframe};

/// How a minute bar's volume is derived from its ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum VolumePolicy {
    /// Volume is the number of ticks in the minute.
    #[default]
    TickCount,
    /// Volume is the sum of the feed's bid-side volumes.
    BidVolume,
}

/// Streaming 1-minute bar builder.
///
/// Consumes a chronologically ordered tick stream and emits an immutable
/// [`Bar`] whenever a minute boundary is crossed. Memory is bounded by a
/// single in-progress bucket; callers feed one hour at a time and call
/// [`MinuteBarBuilder::finish`] to flush the trailing bucket.
///
/// Minutes with zero ticks emit nothing: the series is intentionally
/// sparse and is never filled with placeholder bars. Ticks sharing a
/// timestamp are applied in input order, so the first tick seen in a
/// minute is always the open and the last seen is always the close.
#[derive(Debug, Default)]
pub struct MinuteBarBuilder {
    policy: VolumePolicy,
    current: Option<Bucket>,
}

impl MinuteBarBuilder {
    /// Creates a builder with the default tick-count volume policy.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_policy(VolumePolicy::TickCount)
    }

    /// Creates a builder with an explicit volume policy.
    #[must_use]
    pub const fn with_policy(policy: VolumePolicy) -> Self {
        Self {
            policy,
            current: None,
        }
    }

    /// Processes a tick, emitting the previous minute's bar when this
    /// tick opens a new minute.
    pub fn push(&mut self, tick: Tick) -> Option<Bar> {
        let minute = Timeframe::Minute1.window_start(tick.timestamp);

        match self.current.take() {
            Some(mut bucket) if bucket.minute == minute => {
                bucket.update(&tick, self.policy);
                self.current = Some(bucket);
                None
            }
            Some(bucket) => {
                let completed = bucket.into_bar();
                self.current = Some(Bucket::open(minute, &tick, self.policy));
                Some(completed)
            }
            None => {
                self.current = Some(Bucket::open(minute, &tick, self.policy));
                None
            }
        }
    }

    /// Flushes the in-progress bucket, if any.
    #[must_use]
    pub fn finish(self) -> Option<Bar> {
        self.current.map(Bucket::into_bar)
    }
}

/// In-progress minute bucket.
#[derive(Debug)]
struct Bucket {
    minute: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl Bucket {
    fn open(minute: DateTime<Utc>, tick: &Tick, policy: VolumePolicy) -> Self {
        let price = tick.price();
        Self {
            minute,
            open: price,
            high: price,
            low: price,
            close: price,
            volume: tick_volume(tick, policy),
        }
    }

    fn update(&mut self, tick: &Tick, policy: VolumePolicy) {
        let price = tick.price();
        self.high = self.high.max(price);
        self.low = self.low.min(price);
        self.close = price;
        self.volume += tick_volume(tick, policy);
    }

    const fn into_bar(self) -> Bar {
        Bar::new(
            self.minute,
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
        )
    }
}

fn tick_volume(tick: &Tick, policy: VolumePolicy) -> f64 {
    match policy {
        VolumePolicy::TickCount => 1.0,
        VolumePolicy::BidVolume => f64::from(tick.bid_volume),
    }
}
