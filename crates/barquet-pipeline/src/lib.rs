//! Incremental update coordination for barquet.
//!
//! This crate drives a full update run:
//!
//! - [`UpdateRequest`] - Asset, timeframes, date range, volume policy
//! - [`UpdateCoordinator`] - Hour-by-hour acquisition, aggregation, storage
//! - [`RunReport`] / [`Diagnostic`] - Value-level outcome of a run

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/barquet/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod coordinator;
mod report;

pub use coordinator::{UpdateCoordinator, UpdateRequest};
pub use report::{Diagnostic, DiagnosticKind, RunReport};
