//! Display utilities and output formatting for the barquet CLI.

use anyhow::{Context, Result, bail};
use barquet_lib::prelude::*;
use chrono::NaiveDate;
use clap::ValueEnum;
use std::io::Write;

/// Output format for exported bars.
#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// Returns the file extension for this format.
    pub(crate) const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Write bars as CSV with a header row.
pub(crate) fn write_csv<W: Write>(bars: &[NaiveBar], mut writer: W) -> Result<()> {
    writeln!(writer, "datetime,open,high,low,close,volume")?;
    for bar in bars {
        writeln!(
            writer,
            "{},{},{},{},{},{}",
            bar.datetime.format("%Y-%m-%d %H:%M:%S"),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume
        )?;
    }
    Ok(())
}

/// Write bars as a JSON array.
pub(crate) fn write_json<W: Write>(bars: &[NaiveBar], writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, bars)?;
    Ok(())
}

/// Parse a volume policy string into a VolumePolicy.
pub(crate) fn parse_volume_policy(s: &str) -> Result<VolumePolicy> {
    match s.to_lowercase().as_str() {
        "tick-count" | "tick_count" | "ticks" => Ok(VolumePolicy::TickCount),
        "bid-volume" | "bid_volume" | "bid" => Ok(VolumePolicy::BidVolume),
        _ => bail!("Unknown volume policy: {}. Valid options: tick-count, bid-volume", s),
    }
}

/// Parse a `YYYY-MM-DD` date argument.
pub(crate) fn parse_date(s: &str, what: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("Invalid {what} date: {s}"))
}

/// Parse a timeframe argument, with a CLI-friendly error.
pub(crate) fn parse_timeframe(s: &str) -> Result<Timeframe> {
    s.parse::<Timeframe>().map_err(|e| anyhow::anyhow!("{e}"))
}
