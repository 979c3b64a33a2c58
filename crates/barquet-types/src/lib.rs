//! Core types for the barquet OHLCV bar store.
//!
//! This crate provides the fundamental data structures used throughout
//! barquet:
//!
//! - [`Tick`] - A single price tick with timestamp, ask, bid, and volumes
//! - [`RawTick`] - Raw tick from bi5 binary format before price normalization
//! - [`Bar`] - An OHLCV bar on a fixed calendar grid
//! - [`Timeframe`] - Bar series granularity
//! - [`DateRange`] - Date range for an update or read

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/barquet/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bar;
mod date_range;
mod error;
mod tick;
mod timeframe;

pub use bar::{Bar, NaiveBar};
pub use date_range::{DateRange, HourIterator, MonthIterator};
pub use error::{BarquetError, DateRangeError, Result};
pub use tick::{RawTick, Tick};
pub use timeframe::{Timeframe, TimeframeParseError};
