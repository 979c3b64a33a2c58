//! Tick-to-bar aggregation for barquet.
//!
//! This crate provides the two aggregation stages of the pipeline:
//!
//! - [`MinuteBarBuilder`] - Streaming tick to 1-minute bar builder
//! - [`resample`] - Pure 1-minute to coarser-timeframe resampler

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/barquet/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod minute;
mod resample;

pub use minute::{MinuteBarBuilder, VolumePolicy};
pub use resample::resample;
