//! Tick acquisition boundary for barquet.
//!
//! Acquisition itself (downloading, caching) is an external concern; this
//! crate defines the seam the aggregation pipeline consumes ticks through:
//!
//! - [`TickSource`] - Hour-scoped, lazy tick supplier
//! - [`HourOutcome`] - Ticks for an hour, or an explicit skip with reason
//! - [`LocalBi5Source`] - Reads Dukascopy-layout bi5 hour files from disk

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/barquet/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bi5;
mod outcome;

pub use bi5::{Bi5DecodeError, LocalBi5Source, decode_bi5, parse_raw_ticks};
pub use outcome::HourOutcome;

use chrono::{DateTime, Utc};

/// An hour-scoped supplier of ticks.
///
/// Implementations must return ticks in chronological feed order and must
/// signal "no ticks for this hour" as an empty outcome rather than an
/// error. Unreadable hours are reported as [`HourOutcome::Skipped`] so a
/// long run can continue past them.
pub trait TickSource {
    /// Fetches all ticks for the hour starting at `hour` (UTC, on the
    /// hour boundary).
    fn fetch_hour(&self, asset: &str, hour: DateTime<Utc>) -> HourOutcome;
}
