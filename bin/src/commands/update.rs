//! Update command implementation.
//!
//! Aggregates downloaded bi5 tick hours into bars and merges them into the
//! partitioned store, one asset at a time.

use crate::display::{parse_date, parse_timeframe, parse_volume_policy};
use anyhow::{Context, Result, bail};
use barquet_lib::prelude::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Run an incremental bar update for one or more assets.
#[allow(clippy::too_many_arguments)]
pub(crate) fn update(
    assets: &[String],
    start_str: &str,
    end_str: Option<&str>,
    timeframe_strs: &[String],
    download_root: &Path,
    data_root: &Path,
    volume_str: &str,
    decimal_factor: f64,
    resume: bool,
    json: bool,
    quiet: bool,
) -> Result<()> {
    if assets.is_empty() {
        bail!("No assets given. Example: barquet update EURUSD --start 2024-01-01");
    }

    let start = parse_date(start_str, "start")?;
    let end = match end_str {
        Some(s) => parse_date(s, "end")?,
        None => chrono::Utc::now().date_naive(),
    };
    let range = DateRange::new(start, end)?;

    let timeframes: Vec<Timeframe> = timeframe_strs
        .iter()
        .map(|s| parse_timeframe(s))
        .collect::<Result<_>>()?;
    let volume_policy = parse_volume_policy(volume_str)?;

    if !download_root.exists() {
        bail!("Download root does not exist: {}", download_root.display());
    }

    let mut reports = Vec::with_capacity(assets.len());
    let mut any_diagnostics = false;

    for asset in assets {
        let source =
            LocalBi5Source::new(download_root).with_decimal_factor(decimal_factor);
        let store = PartitionStore::new(data_root);
        let coordinator = UpdateCoordinator::new(source, store);

        let request = UpdateRequest::new(asset.clone(), timeframes.clone(), range)
            .with_volume_policy(volume_policy)
            .with_resume(resume);

        let progress = if quiet || json {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {msg}")
                    .expect("Invalid progress template"),
            );
            pb.set_message(format!(
                "{asset} {start} -> {end} ({} hours)",
                range.total_hours()
            ));
            pb.enable_steady_tick(std::time::Duration::from_millis(120));
            pb
        };

        let report = coordinator
            .run(&request)
            .with_context(|| format!("Update failed for {asset}"))?;

        progress.finish_with_message(format!(
            "{asset}: {} bars written, {} hours processed, {} hours skipped",
            report.total_bars_written(),
            report.hours_processed,
            report.hours_skipped
        ));

        any_diagnostics |= !report.is_clean();
        reports.push(report);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    if !quiet {
        for report in &reports {
            print_report(report);
        }
        if any_diagnostics {
            eprintln!("Completed with warnings. Re-run the same range to retry skipped hours.");
        }
    }

    Ok(())
}

fn print_report(report: &RunReport) {
    println!("\n{}", report.asset);
    println!("{}", "-".repeat(40));
    for (timeframe, count) in &report.bars_written {
        println!("  {:<6} {:>10} bars", timeframe.as_str(), count);
    }
    println!("  hours processed: {}", report.hours_processed);
    if report.hours_skipped > 0 {
        println!("  hours skipped:   {}", report.hours_skipped);
    }
    if report.partitions_failed > 0 {
        println!("  partitions failed: {}", report.partitions_failed);
    }
    for diagnostic in &report.diagnostics {
        println!(
            "  warning: {} {} ({}): {}",
            diagnostic.timestamp_utc.format("%Y-%m-%d %H:%M"),
            diagnostic.asset,
            diagnostic.source,
            diagnostic.reason
        );
    }
}
