//! Encodes a page as a single-row-group Parquet file for a warehouse load job.
//!
//! There is no schema introspection: each column's Arrow type is inferred
//! from the values the page carries (see `DataType::merge`), and the
//! warehouse autodetects its table schema from the file.

use crate::error::DestinationError;
use arrow::{
    array::{
        ArrayRef, BinaryArray, BooleanArray, Date32Array, Decimal128Array, Float64Array,
        Int64Array, StringArray, Time64MicrosecondArray, TimestampMicrosecondArray,
    },
    datatypes::{DataType as ArrowType, Field, Schema, TimeUnit},
    record_batch::RecordBatch,
};
use chrono::{Datelike, NaiveTime, Timelike};
use model::{
    core::{data_type::DataType, value::Value},
    records::batch::Page,
};
use parquet::{
    arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties,
};
use std::{fs::File, path::Path, sync::Arc};

const MAX_DECIMAL_PRECISION: u32 = 38;
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Writes `batch` to `path` and returns the size of the written file.
/// Blocking: encoding, compression and file I/O all happen on the caller.
pub fn write_batch(batch: &RecordBatch, path: &Path) -> Result<u64, DestinationError> {
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(batch)?;
    writer.close()?;

    Ok(std::fs::metadata(path)?.len())
}

pub fn to_record_batch(page: &Page) -> Result<RecordBatch, DestinationError> {
    let names = page.column_names();
    if names.is_empty() {
        return Err(DestinationError::Staging("page has no columns".into()));
    }

    let mut fields = Vec::with_capacity(names.len());
    let mut arrays = Vec::with_capacity(names.len());

    for (idx, name) in names.iter().enumerate() {
        let column: Vec<&Value> = page
            .rows
            .iter()
            .map(|row| {
                row.field_values
                    .get(idx)
                    .map(|f| &f.value)
                    .unwrap_or(&Value::Null)
            })
            .collect();

        let data_type = infer_type(&column);
        let array = build_array(name, data_type, &column)?;
        fields.push(Field::new(*name, array.data_type().clone(), true));
        arrays.push(array);
    }

    let schema = Arc::new(Schema::new(fields));
    Ok(RecordBatch::try_new(schema, arrays)?)
}

fn infer_type(column: &[&Value]) -> DataType {
    column
        .iter()
        .fold(DataType::Null, |acc, v| acc.merge(v.data_type()))
}

fn build_array(
    name: &str,
    data_type: DataType,
    column: &[&Value],
) -> Result<ArrayRef, DestinationError> {
    let array: ArrayRef = match data_type {
        DataType::Int => Arc::new(Int64Array::from_iter(column.iter().map(|v| v.as_i64()))),
        DataType::Float => Arc::new(Float64Array::from_iter(column.iter().map(|v| v.as_f64()))),
        DataType::Decimal { scale } => {
            let values = column
                .iter()
                .map(|v| rescale(name, v, scale))
                .collect::<Result<Vec<_>, _>>()?;
            let precision = decimal_precision(name, &values, scale)?;
            Arc::new(
                Decimal128Array::from(values).with_precision_and_scale(precision, scale as i8)?,
            )
        }
        DataType::String => Arc::new(StringArray::from_iter(column.iter().map(|v| match v {
            Value::Bytes(b) => Some(hex(b)),
            other => other.as_string(),
        }))),
        DataType::Boolean => Arc::new(BooleanArray::from_iter(column.iter().map(|v| match v {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }))),
        DataType::Bytes => Arc::new(BinaryArray::from_iter(column.iter().map(|v| match v {
            Value::Bytes(b) => Some(b.as_slice()),
            _ => None,
        }))),
        DataType::Date => Arc::new(Date32Array::from_iter(column.iter().map(|v| match v {
            Value::Date(d) => Some(d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE),
            _ => None,
        }))),
        DataType::Time => Arc::new(Time64MicrosecondArray::from_iter(column.iter().map(
            |v| match v {
                Value::Time(t) => Some(time_micros(t)),
                _ => None,
            },
        ))),
        DataType::DateTime => Arc::new(TimestampMicrosecondArray::from_iter(column.iter().map(
            |v| match v {
                Value::DateTime(dt) => Some(dt.and_utc().timestamp_micros()),
                Value::Date(d) => Some(d.and_time(NaiveTime::MIN).and_utc().timestamp_micros()),
                _ => None,
            },
        ))),
        DataType::Timestamp => Arc::new(
            TimestampMicrosecondArray::from_iter(column.iter().map(|v| match v {
                Value::Timestamp(ts) => Some(ts.timestamp_micros()),
                _ => None,
            }))
            .with_timezone("UTC"),
        ),
        // A column that is null on every row of this page.
        DataType::Null => Arc::new(StringArray::from(vec![None::<&str>; column.len()])),
    };

    Ok(array)
}

fn rescale(name: &str, value: &Value, target: u8) -> Result<Option<i128>, DestinationError> {
    let (unscaled, scale) = match value {
        Value::Decimal { unscaled, scale } => (*unscaled, *scale),
        Value::Int(v) => (i128::from(*v), 0),
        _ => return Ok(None),
    };

    10i128
        .checked_pow(u32::from(target.saturating_sub(scale)))
        .and_then(|factor| unscaled.checked_mul(factor))
        .map(Some)
        .ok_or_else(|| decimal_overflow(name, target))
}

/// Smallest precision that holds every value of the column, so narrow
/// source decimals are not widened to 38 digits by the warehouse.
fn decimal_precision(
    name: &str,
    values: &[Option<i128>],
    scale: u8,
) -> Result<u8, DestinationError> {
    let widest = values
        .iter()
        .flatten()
        .map(|v| v.unsigned_abs().checked_ilog10().map_or(1, |d| d + 1))
        .max()
        .unwrap_or(1);

    if widest > MAX_DECIMAL_PRECISION {
        return Err(decimal_overflow(name, scale));
    }

    // At least one integer digit, and never narrower than the scale.
    let precision = widest.max(u32::from(scale) + 1).min(MAX_DECIMAL_PRECISION);
    Ok(precision as u8)
}

fn decimal_overflow(name: &str, scale: u8) -> DestinationError {
    DestinationError::Staging(format!(
        "decimal value in column '{name}' exceeds {MAX_DECIMAL_PRECISION} digits at scale {scale}"
    ))
}

fn time_micros(t: &NaiveTime) -> i64 {
    i64::from(t.num_seconds_from_midnight()) * 1_000_000 + i64::from(t.nanosecond() / 1_000)
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
