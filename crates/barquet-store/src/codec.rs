//! Parquet encode/decode for one partition file.
//!
//! The store treats a partition file as an opaque whole-file primitive:
//! whole-file replace on write, whole-file load on read. Schema is fixed
//! at six columns: `datetime` (UTC microsecond timestamp) and
//! `open`/`high`/`low`/`close`/`volume` as 64-bit floats.

use arrow::array::{Array, Float64Array, TimestampMicrosecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::DateTime;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use barquet_types::{Bar, BarquetError};

/// Rows per Parquet row group.
const ROW_GROUP_SIZE: usize = 50_000;

/// Creates the Arrow schema for bar data.
fn bar_schema() -> Schema {
    Schema::new(vec![
        Field::new(
            "datetime",
            DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
            false,
        ),
        Field::new("open", DataType::Float64, false),
        Field::new("high", DataType::Float64, false),
        Field::new("low", DataType::Float64, false),
        Field::new("close", DataType::Float64, false),
        Field::new("volume", DataType::Float64, false),
    ])
}

/// Converts bars to an Arrow RecordBatch.
fn bars_to_batch(bars: &[Bar]) -> Result<RecordBatch, BarquetError> {
    let datetimes: Vec<_> = bars.iter().map(|b| b.datetime.timestamp_micros()).collect();
    let opens: Vec<_> = bars.iter().map(|b| b.open).collect();
    let highs: Vec<_> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<_> = bars.iter().map(|b| b.low).collect();
    let closes: Vec<_> = bars.iter().map(|b| b.close).collect();
    let volumes: Vec<_> = bars.iter().map(|b| b.volume).collect();

    RecordBatch::try_new(
        Arc::new(bar_schema()),
        vec![
            Arc::new(TimestampMicrosecondArray::from(datetimes).with_timezone("UTC")),
            Arc::new(Float64Array::from(opens)),
            Arc::new(Float64Array::from(highs)),
            Arc::new(Float64Array::from(lows)),
            Arc::new(Float64Array::from(closes)),
            Arc::new(Float64Array::from(volumes)),
        ],
    )
    .map_err(|e| BarquetError::Parquet(e.to_string()))
}

/// Writes bars as a complete Parquet file to `writer`.
pub(crate) fn write_bars<W: Write + Send>(bars: &[Bar], writer: W) -> Result<(), BarquetError> {
    let schema = Arc::new(bar_schema());
    let props = WriterProperties::builder()
        .set_compression(Compression::ZSTD(ZstdLevel::default()))
        .set_max_row_group_size(ROW_GROUP_SIZE)
        .build();

    let mut arrow_writer = ArrowWriter::try_new(writer, schema, Some(props))
        .map_err(|e| BarquetError::Parquet(e.to_string()))?;

    for chunk in bars.chunks(ROW_GROUP_SIZE) {
        let batch = bars_to_batch(chunk)?;
        arrow_writer
            .write(&batch)
            .map_err(|e| BarquetError::Parquet(e.to_string()))?;
    }

    arrow_writer
        .close()
        .map_err(|e| BarquetError::Parquet(e.to_string()))?;

    Ok(())
}

/// Loads a whole partition file back into bars.
pub(crate) fn read_bars(path: &Path) -> Result<Vec<Bar>, BarquetError> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| BarquetError::Parquet(e.to_string()))?;
    let reader = builder
        .build()
        .map_err(|e| BarquetError::Parquet(e.to_string()))?;

    let mut bars = Vec::new();
    for batch in reader {
        let batch = batch.map_err(|e| BarquetError::Parquet(e.to_string()))?;
        bars.extend(batch_to_bars(&batch)?);
    }
    Ok(bars)
}

/// Decodes one RecordBatch into bars.
fn batch_to_bars(batch: &RecordBatch) -> Result<Vec<Bar>, BarquetError> {
    let datetimes = timestamp_col(batch, 0)?;
    let opens = float_col(batch, 1)?;
    let highs = float_col(batch, 2)?;
    let lows = float_col(batch, 3)?;
    let closes = float_col(batch, 4)?;
    let volumes = float_col(batch, 5)?;

    let mut bars = Vec::with_capacity(batch.num_rows());
    for row in 0..batch.num_rows() {
        let micros = datetimes.value(row);
        let datetime = DateTime::from_timestamp_micros(micros).ok_or_else(|| {
            BarquetError::Parquet(format!("timestamp out of range: {micros}"))
        })?;
        bars.push(Bar::new(
            datetime,
            opens.value(row),
            highs.value(row),
            lows.value(row),
            closes.value(row),
            volumes.value(row),
        ));
    }
    Ok(bars)
}

fn timestamp_col<'a>(
    batch: &'a RecordBatch,
    index: usize,
) -> Result<&'a TimestampMicrosecondArray, BarquetError> {
    batch
        .column(index)
        .as_any()
        .downcast_ref::<TimestampMicrosecondArray>()
        .ok_or_else(|| BarquetError::Parquet(format!("column {index} is not a UTC timestamp")))
}

fn float_col<'a>(batch: &'a RecordBatch, index: usize) -> Result<&'a Float64Array, BarquetError> {
    batch
        .column(index)
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| BarquetError::Parquet(format!("column {index} is not a float column")))
}
