//! Tick data representation.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A single tick representing a price update.
///
/// Ticks are transient: they exist only inside the aggregation window
/// currently being processed and are never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Timestamp of the tick (UTC).
    pub timestamp: DateTime<Utc>,
    /// Bid price. Aggregation prices are taken from this side.
    pub bid: f64,
    /// Ask (offer) price.
    pub ask: f64,
    /// Volume available at the bid price.
    pub bid_volume: f32,
    /// Volume available at the ask price.
    pub ask_volume: f32,
}

impl Tick {
    /// Creates a new tick.
    #[must_use]
    pub const fn new(
        timestamp: DateTime<Utc>,
        bid: f64,
        ask: f64,
        bid_volume: f32,
        ask_volume: f32,
    ) -> Self {
        Self {
            timestamp,
            bid,
            ask,
            bid_volume,
            ask_volume,
        }
    }

    /// Returns the price used for OHLCV aggregation (the bid).
    #[must_use]
    pub const fn price(&self) -> f64 {
        self.bid
    }

    /// Returns the spread (ask - bid).
    #[must_use]
    pub fn spread(&self) -> f64 {
        self.ask - self.bid
    }
}

/// Raw tick as read from a bi5 hour file (before price normalization).
///
/// The bi5 format stores ticks as 20 bytes in big-endian order:
/// - `u32`: milliseconds offset from hour start
/// - `u32`: ask price (raw, needs division by decimal factor)
/// - `u32`: bid price (raw, needs division by decimal factor)
/// - `f32`: ask volume
/// - `f32`: bid volume
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawTick {
    /// Milliseconds offset from the hour start.
    pub ms_offset: u32,
    /// Raw ask price (needs division by decimal factor).
    pub ask_raw: u32,
    /// Raw bid price (needs division by decimal factor).
    pub bid_raw: u32,
    /// Ask volume.
    pub ask_volume: f32,
    /// Bid volume.
    pub bid_volume: f32,
}

impl RawTick {
    /// Size in bytes of a raw tick record.
    pub const SIZE: usize = 20;

    /// Creates a new raw tick.
    #[must_use]
    pub const fn new(
        ms_offset: u32,
        ask_raw: u32,
        bid_raw: u32,
        ask_volume: f32,
        bid_volume: f32,
    ) -> Self {
        Self {
            ms_offset,
            ask_raw,
            bid_raw,
            ask_volume,
            bid_volume,
        }
    }

    /// Normalizes the raw tick against the hour origin and decimal factor.
    ///
    /// The decimal factor converts the raw integer prices to floating-point
    /// prices. For example, EUR/USD has a decimal factor of 100,000, so a
    /// raw price of 112345 becomes 1.12345.
    #[must_use]
    pub fn normalize(self, hour_start: DateTime<Utc>, decimal_factor: f64) -> Tick {
        let timestamp = hour_start + TimeDelta::milliseconds(i64::from(self.ms_offset));
        Tick {
            timestamp,
            bid: f64::from(self.bid_raw) / decimal_factor,
            ask: f64::from(self.ask_raw) / decimal_factor,
            bid_volume: self.bid_volume,
            ask_volume: self.ask_volume,
        }
    }
}
