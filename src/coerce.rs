//! Typed value coercion between textual CLI input and MySQL column types.
//!
//! Every replacement value and key value arrives as text; before it can be
//! bound into a prepared statement it has to become a value of the target
//! column's declared type. Failures always name the column and the raw text.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

use crate::error::RecordError;

/// `YYYY-MM-DD`, locale-independent.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// `YYYY-MM-DD HH:MM:SS`, 24-hour, locale-independent.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// `HH:MM:SS`, 24-hour.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Declared SQL type of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    BigInt,
    Decimal,
    SmallInt,
    TinyInt,
    Float,
    Double,
    Date,
    Time,
    Timestamp,
    Blob,
    Clob,
    /// VARCHAR/CHAR and anything not covered above; passed through as text.
    Text,
}

impl ColumnType {
    /// Map an `information_schema.columns` `DATA_TYPE` to a column type.
    ///
    /// MySQL reports NUMERIC columns as `decimal`, so both take the
    /// arbitrary-precision path.
    pub fn from_data_type(data_type: &str) -> Self {
        match data_type.to_ascii_lowercase().as_str() {
            "int" | "integer" | "mediumint" => Self::Integer,
            "bigint" => Self::BigInt,
            "decimal" | "dec" | "numeric" => Self::Decimal,
            "smallint" => Self::SmallInt,
            "tinyint" => Self::TinyInt,
            "float" => Self::Float,
            "double" | "real" => Self::Double,
            "date" => Self::Date,
            "time" => Self::Time,
            "datetime" | "timestamp" => Self::Timestamp,
            "blob" | "tinyblob" | "mediumblob" | "longblob" | "binary" | "varbinary" => Self::Blob,
            "text" | "tinytext" | "mediumtext" | "longtext" => Self::Clob,
            _ => Self::Text,
        }
    }
}

/// Dynamic value type for statement bindings.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Null,
    Int(i32),
    BigInt(i64),
    Decimal(Decimal),
    SmallInt(i16),
    TinyInt(i8),
    Float(f32),
    Double(f64),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Text(String),
    Bytes(Vec<u8>),
}

/// Convert a textual value to a value of the given column type.
///
/// TINYINT is parsed as a 16-bit integer first so that an in-range parse
/// followed by an out-of-range value reports a range error rather than a
/// parse error. DATE accepts a bare date or a full datetime, taking the
/// date portion of the latter.
pub fn coerce(column: &str, text: &str, ty: ColumnType) -> Result<TypedValue, RecordError> {
    let parse_err = || RecordError::parse(column, text);

    let value = match ty {
        ColumnType::Integer => TypedValue::Int(text.parse().map_err(|_| parse_err())?),
        ColumnType::BigInt => TypedValue::BigInt(text.parse().map_err(|_| parse_err())?),
        ColumnType::Decimal => {
            TypedValue::Decimal(Decimal::from_str(text).map_err(|_| parse_err())?)
        }
        ColumnType::SmallInt => TypedValue::SmallInt(text.parse().map_err(|_| parse_err())?),
        ColumnType::TinyInt => {
            let wide: i16 = text.parse().map_err(|_| parse_err())?;
            if !(-128..=127).contains(&wide) {
                return Err(RecordError::range(column, text));
            }
            TypedValue::TinyInt(wide as i8)
        }
        ColumnType::Float => TypedValue::Float(text.parse().map_err(|_| parse_err())?),
        ColumnType::Double => TypedValue::Double(text.parse().map_err(|_| parse_err())?),
        ColumnType::Date => {
            let date = NaiveDate::parse_from_str(text, DATE_FORMAT)
                .or_else(|_| {
                    NaiveDateTime::parse_from_str(text, DATETIME_FORMAT).map(|dt| dt.date())
                })
                .map_err(|_| parse_err())?;
            TypedValue::Date(date)
        }
        ColumnType::Time => {
            TypedValue::Time(NaiveTime::parse_from_str(text, TIME_FORMAT).map_err(|_| parse_err())?)
        }
        ColumnType::Timestamp => TypedValue::DateTime(
            NaiveDateTime::parse_from_str(text, DATETIME_FORMAT).map_err(|_| parse_err())?,
        ),
        ColumnType::Blob | ColumnType::Clob | ColumnType::Text => {
            TypedValue::Text(text.to_string())
        }
    };

    Ok(value)
}
