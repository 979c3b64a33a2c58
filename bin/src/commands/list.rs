//! List command implementation.
//!
//! Scans the partitioned store and prints every stored series with the
//! timestamp of its newest bar.

use anyhow::Result;
use barquet_lib::prelude::*;
use std::path::Path;

/// List stored bar series under a data root.
pub(crate) fn list(data_root: &Path) -> Result<()> {
    if !data_root.exists() {
        println!("No data found at {}", data_root.display());
        return Ok(());
    }

    let store = PartitionStore::new(data_root);
    let mut rows = Vec::new();

    for asset in subdirs_with_prefix(data_root, "asset=")? {
        for &timeframe in Timeframe::all() {
            match store.last_timestamp(&asset, timeframe) {
                Ok(Some(newest)) => rows.push((
                    asset.clone(),
                    timeframe,
                    newest.format("%Y-%m-%d %H:%M").to_string(),
                )),
                Ok(None) => {}
                Err(e) => rows.push((asset.clone(), timeframe, format!("error: {e}"))),
            }
        }
    }

    if rows.is_empty() {
        println!("No bar series stored at {}", data_root.display());
        return Ok(());
    }

    println!("{:<12} {:<6} {:<20}", "ASSET", "TF", "NEWEST BAR");
    println!("{}", "-".repeat(40));
    for (asset, timeframe, newest) in &rows {
        println!("{:<12} {:<6} {:<20}", asset, timeframe.as_str(), newest);
    }
    println!("\nTotal: {} series", rows.len());

    Ok(())
}

/// Returns the values of `<prefix><value>` subdirectories, sorted.
fn subdirs_with_prefix(dir: &Path, prefix: &str) -> Result<Vec<String>> {
    let mut values = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        if let Some(value) = name.to_string_lossy().strip_prefix(prefix) {
            values.push(value.to_string());
        }
    }
    values.sort();
    Ok(values)
}
