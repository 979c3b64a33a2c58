//! barquet CLI - incremental OHLCV bar builder and query tool.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod display;

#[derive(Parser)]
#[command(name = "barquet")]
#[command(about = "Incremental OHLCV bar builder over partitioned Parquet storage", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress progress output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate downloaded ticks into bars and merge them into the store
    Update {
        /// Asset identifiers (e.g. EURUSD GBPUSD)
        assets: Vec<String>,

        /// Start date (YYYY-MM-DD)
        #[arg(short, long)]
        start: String,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(short, long)]
        end: Option<String>,

        /// Timeframes to build (m1, m5, m15, m30, h1, h4, d1)
        #[arg(short, long, default_values = ["m1"])]
        timeframes: Vec<String>,

        /// Root of the bi5 tick download tree
        #[arg(long, default_value = "download")]
        download_root: PathBuf,

        /// Root of the partitioned bar store
        #[arg(long, default_value = "data_parquet")]
        data_root: PathBuf,

        /// Volume policy: tick-count or bid-volume
        #[arg(long, default_value = "tick-count")]
        volume: String,

        /// Decimal factor for raw bi5 prices
        #[arg(long, default_value = "100000")]
        decimal_factor: f64,

        /// Start from the newest stored minute bar instead of --start
        #[arg(long)]
        resume: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Read a bar range from the store and export it
    Export {
        /// Asset identifier
        asset: String,

        /// Timeframe to read
        #[arg(short, long, default_value = "h1")]
        timeframe: String,

        /// Start date (YYYY-MM-DD)
        #[arg(short, long)]
        start: String,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(short, long)]
        end: Option<String>,

        /// Root of the partitioned bar store
        #[arg(long, default_value = "data_parquet")]
        data_root: PathBuf,

        /// Output file path. Writes CSV to stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (csv or json)
        #[arg(short, long, default_value = "csv")]
        format: display::ExportFormat,
    },

    /// List stored bar series and their newest timestamps
    List {
        /// Root of the partitioned bar store
        #[arg(long, default_value = "data_parquet")]
        data_root: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Update {
            assets,
            start,
            end,
            timeframes,
            download_root,
            data_root,
            volume,
            decimal_factor,
            resume,
            json,
        } => commands::update::update(
            &assets,
            &start,
            end.as_deref(),
            &timeframes,
            &download_root,
            &data_root,
            &volume,
            decimal_factor,
            resume,
            json,
            cli.quiet,
        ),
        Commands::Export {
            asset,
            timeframe,
            start,
            end,
            data_root,
            output,
            format,
        } => commands::export::export(
            &asset,
            &timeframe,
            &start,
            end.as_deref(),
            &data_root,
            output.as_deref(),
            format,
        ),
        Commands::List { data_root } => commands::list::list(&data_root),
    }
}
