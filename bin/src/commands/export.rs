//! Export command implementation.
//!
//! Reads a bar range from the partitioned store and writes it as CSV or
//! JSON, to a file or to stdout.

use crate::display::{ExportFormat, parse_date, parse_timeframe, write_csv, write_json};
use anyhow::{Context, Result};
use barquet_lib::prelude::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Export stored bars for one asset and timeframe.
pub(crate) fn export(
    asset: &str,
    timeframe_str: &str,
    start_str: &str,
    end_str: Option<&str>,
    data_root: &Path,
    output: Option<&Path>,
    format: ExportFormat,
) -> Result<()> {
    let timeframe = parse_timeframe(timeframe_str)?;

    let start = parse_date(start_str, "start")?;
    let end = match end_str {
        Some(s) => parse_date(s, "end")?,
        None => chrono::Utc::now().date_naive(),
    };
    let range = DateRange::new(start, end)?;

    let store = PartitionStore::new(data_root);
    let bars = store
        .read_bars_naive(asset, timeframe, range.start_utc(), range.end_utc())
        .with_context(|| format!("Failed to read {asset} {}", timeframe.as_str()))?;

    if bars.is_empty() {
        eprintln!("No bars stored for {asset} {} in {start} -> {end}", timeframe.as_str());
        return Ok(());
    }

    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let writer = BufWriter::new(file);
            match format {
                ExportFormat::Csv => write_csv(&bars, writer)?,
                ExportFormat::Json => write_json(&bars, writer)?,
            }
            eprintln!("Wrote {} bars to {}", bars.len(), path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let writer = stdout.lock();
            match format {
                ExportFormat::Csv => write_csv(&bars, writer)?,
                ExportFormat::Json => write_json(&bars, writer)?,
            }
        }
    }

    Ok(())
}
