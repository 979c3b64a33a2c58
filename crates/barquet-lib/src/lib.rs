//! Incremental OHLCV bar aggregation and partitioned Parquet storage.
//!
//! This is a facade crate that re-exports functionality from the barquet
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use barquet_lib::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = LocalBi5Source::new("download");
//!     let store = PartitionStore::new("data_parquet");
//!     let coordinator = UpdateCoordinator::new(source, store);
//!
//!     let range = DateRange::new(
//!         chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!         chrono::NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
//!     )?;
//!     let request = UpdateRequest::new(
//!         "EURUSD".to_string(),
//!         vec![Timeframe::Minute1, Timeframe::Hour1],
//!         range,
//!     );
//!
//!     let report = coordinator.run(&request)?;
//!     println!("wrote {} bars", report.total_bars_written());
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/barquet/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use barquet_types::*;

// Re-export the acquisition boundary
pub use barquet_source::{Bi5DecodeError, HourOutcome, LocalBi5Source, TickSource};

// Re-export aggregation
pub use barquet_aggregate::{MinuteBarBuilder, VolumePolicy, resample};

// Re-export storage
pub use barquet_store::{PartitionFailure, PartitionKey, PartitionStore, WriteReport};

// Re-export the pipeline
pub use barquet_pipeline::{Diagnostic, DiagnosticKind, RunReport, UpdateCoordinator, UpdateRequest};

/// Prelude module for convenient imports.
///
/// ```
/// use barquet_lib::prelude::*;
/// ```
pub mod prelude {
    pub use barquet_types::{
        Bar, BarquetError, DateRange, DateRangeError, NaiveBar, RawTick, Result, Tick, Timeframe,
    };

    pub use barquet_source::{HourOutcome, LocalBi5Source, TickSource};

    pub use barquet_aggregate::{MinuteBarBuilder, VolumePolicy, resample};

    pub use barquet_store::{PartitionKey, PartitionStore, WriteReport};

    pub use barquet_pipeline::{Diagnostic, RunReport, UpdateCoordinator, UpdateRequest};
}
