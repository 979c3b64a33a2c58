//! Partitioned bar storage for barquet.
//!
//! This crate owns the on-disk partition tree and its correctness
//! guarantees:
//!
//! - [`PartitionKey`] - Pure (asset, timeframe, year, month) key
//! - [`PartitionStore`] - Incremental merge writes and selective reads
//! - [`WriteReport`] - Per-call write outcome including isolated failures

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/barquet/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod codec;
mod key;
mod store;

pub use key::PartitionKey;
pub use store::{PartitionFailure, PartitionStore, WriteReport};
