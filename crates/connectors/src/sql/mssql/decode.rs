use crate::error::SourceError;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use model::{core::value::Value, records::row::RowData};
use tiberius::{ColumnData, FromSql, Row};

/// Converts a tiberius row into a `RowData`, keeping column order.
pub fn decode_row(row: Row) -> Result<RowData, SourceError> {
    let names: Vec<String> = row
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    names
        .into_iter()
        .zip(row)
        .map(|(name, data)| {
            let value = decode_value(&name, data)?;
            Ok((name, value))
        })
        .collect()
}

/// Reads a COUNT(*) / COUNT_BIG(*) scalar.
pub fn decode_count(data: ColumnData<'static>) -> Option<u64> {
    match data {
        ColumnData::U8(Some(v)) => Some(u64::from(v)),
        ColumnData::I16(Some(v)) => u64::try_from(v).ok(),
        ColumnData::I32(Some(v)) => u64::try_from(v).ok(),
        ColumnData::I64(Some(v)) => u64::try_from(v).ok(),
        ColumnData::Numeric(Some(n)) if n.scale() == 0 => u64::try_from(n.value()).ok(),
        _ => None,
    }
}

fn decode_value(column: &str, data: ColumnData<'static>) -> Result<Value, SourceError> {
    let value = match data {
        ColumnData::U8(v) => v.map(|v| Value::Int(i64::from(v))),
        ColumnData::I16(v) => v.map(|v| Value::Int(i64::from(v))),
        ColumnData::I32(v) => v.map(|v| Value::Int(i64::from(v))),
        ColumnData::I64(v) => v.map(Value::Int),
        ColumnData::F32(v) => v.map(|v| Value::Float(f64::from(v))),
        ColumnData::F64(v) => v.map(Value::Float),
        ColumnData::Bit(v) => v.map(Value::Boolean),
        ColumnData::String(v) => v.map(|s| Value::String(s.into_owned())),
        ColumnData::Guid(v) => v.map(Value::Uuid),
        ColumnData::Binary(v) => v.map(|b| Value::Bytes(b.into_owned())),
        ColumnData::Numeric(v) => v.map(|n| Value::Decimal {
            unscaled: n.value(),
            scale: n.scale(),
        }),
        ColumnData::Xml(v) => v.map(|x| Value::String(x.into_owned().into_string())),
        other => decode_temporal(column, &other)?,
    };

    Ok(value.unwrap_or(Value::Null))
}

// Date and time columns come in several TDS encodings; tiberius's chrono
// conversions pick the matching one and reject the rest.
fn decode_temporal(column: &str, data: &ColumnData<'static>) -> Result<Option<Value>, SourceError> {
    if let Ok(v) = NaiveDateTime::from_sql(data) {
        return Ok(v.map(Value::DateTime));
    }
    if let Ok(v) = NaiveDate::from_sql(data) {
        return Ok(v.map(Value::Date));
    }
    if let Ok(v) = NaiveTime::from_sql(data) {
        return Ok(v.map(Value::Time));
    }
    if let Ok(v) = DateTime::<FixedOffset>::from_sql(data) {
        return Ok(v.map(|dt| Value::Timestamp(dt.with_timezone(&Utc))));
    }

    Err(SourceError::Decode {
        column: column.to_string(),
        message: format!("unsupported column data {data:?}"),
    })
}
