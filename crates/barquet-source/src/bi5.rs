//! Local bi5 hour-file tick source.
//!
//! Reads the on-disk tree produced by a Dukascopy downloader:
//! `<root>/<ASSET>/<year>/<month>/<day>/<hour>h_ticks.bi5`, where the
//! month directory is zero-based (January = `00`). Each file is an
//! LZMA-compressed sequence of 20-byte big-endian tick records.

use byteorder::{BigEndian, ByteOrder};
use chrono::{DateTime, Datelike, Timelike, Utc};
use lzma_rs::lzma_decompress;
use std::io::{BufReader, Cursor};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use barquet_types::{RawTick, Tick};

use crate::{HourOutcome, TickSource};

/// Errors that can occur while decoding a bi5 hour file.
#[derive(Error, Debug)]
pub enum Bi5DecodeError {
    /// LZMA decompression failed.
    #[error("LZMA decompression failed: {0}")]
    Lzma(String),

    /// Decompressed length is not a multiple of the tick record size.
    #[error("Invalid data length: {0} bytes (expected multiple of {1})")]
    InvalidLength(usize, usize),
}

/// Decompresses a bi5 file body into raw tick bytes.
///
/// # Errors
///
/// Returns an error if LZMA decompression fails.
pub fn decode_bi5(compressed: &[u8]) -> Result<Vec<u8>, Bi5DecodeError> {
    let mut decompressed = Vec::new();
    let mut reader = BufReader::new(Cursor::new(compressed));

    lzma_decompress(&mut reader, &mut decompressed).map_err(|e| Bi5DecodeError::Lzma(e.to_string()))?;

    Ok(decompressed)
}

/// Parses raw ticks from decompressed bi5 data.
///
/// # Errors
///
/// Returns an error if the data length is not a multiple of
/// [`RawTick::SIZE`].
pub fn parse_raw_ticks(data: &[u8]) -> Result<impl Iterator<Item = RawTick> + '_, Bi5DecodeError> {
    if !data.len().is_multiple_of(RawTick::SIZE) {
        return Err(Bi5DecodeError::InvalidLength(data.len(), RawTick::SIZE));
    }

    Ok(data.chunks_exact(RawTick::SIZE).map(|chunk| {
        RawTick::new(
            BigEndian::read_u32(&chunk[0..4]),
            BigEndian::read_u32(&chunk[4..8]),
            BigEndian::read_u32(&chunk[8..12]),
            BigEndian::read_f32(&chunk[12..16]),
            BigEndian::read_f32(&chunk[16..20]),
        )
    }))
}

/// Tick source reading bi5 hour files from a local download tree.
#[derive(Debug, Clone)]
pub struct LocalBi5Source {
    download_root: PathBuf,
    decimal_factor: f64,
}

impl LocalBi5Source {
    /// Default decimal factor (5-digit forex pairs such as EUR/USD).
    pub const DEFAULT_DECIMAL_FACTOR: f64 = 100_000.0;

    /// Creates a source rooted at `download_root`.
    #[must_use]
    pub fn new(download_root: impl Into<PathBuf>) -> Self {
        Self {
            download_root: download_root.into(),
            decimal_factor: Self::DEFAULT_DECIMAL_FACTOR,
        }
    }

    /// Sets the decimal factor used to normalize raw integer prices.
    #[must_use]
    pub const fn with_decimal_factor(mut self, decimal_factor: f64) -> Self {
        self.decimal_factor = decimal_factor;
        self
    }

    /// Returns the download tree root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.download_root
    }

    /// Returns the path of the hour file for `asset` at `hour`.
    ///
    /// The month path component is zero-based, matching the Dukascopy
    /// feed layout.
    #[must_use]
    pub fn hour_path(&self, asset: &str, hour: DateTime<Utc>) -> PathBuf {
        self.download_root
            .join(asset)
            .join(format!("{:04}", hour.year()))
            .join(format!("{:02}", hour.month0()))
            .join(format!("{:02}", hour.day()))
            .join(format!("{:02}h_ticks.bi5", hour.hour()))
    }
}

impl TickSource for LocalBi5Source {
    fn fetch_hour(&self, asset: &str, hour: DateTime<Utc>) -> HourOutcome {
        let path = self.hour_path(asset, hour);
        let path_str = path.display().to_string();

        let compressed = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(asset, %hour, path = %path_str, "missing hour file: {e}");
                return HourOutcome::skipped(path_str, format!("hour file unreadable: {e}"));
            }
        };

        // Interrupted downloads leave zero-length files behind; treat them
        // as missing data instead of aborting the run.
        if compressed.is_empty() {
            warn!(asset, %hour, path = %path_str, "empty hour file");
            return HourOutcome::skipped(path_str, "empty hour file");
        }

        let decompressed = match decode_bi5(&compressed) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(asset, %hour, path = %path_str, "failed to decode hour file: {e}");
                return HourOutcome::skipped(path_str, e.to_string());
            }
        };

        match parse_raw_ticks(&decompressed) {
            Ok(raw_ticks) => {
                let ticks: Vec<Tick> = raw_ticks
                    .map(|raw| raw.normalize(hour, self.decimal_factor))
                    .collect();
                HourOutcome::Ticks(ticks)
            }
            Err(e) => {
                warn!(asset, %hour, path = %path_str, "malformed hour file: {e}");
                HourOutcome::skipped(path_str, e.to_string())
            }
        }
    }
}
