//! Scan：把结果集里的 [`SqlValue`] 写回 Rust 字段。
//!
//! 类型转换以驱动返回的值为准：例如 SQLite 的 boolean 以整数返回、datetime 以 RFC 3339 文本返回，
//! 这里统一做宽松但无损的转换；有损或越界的转换返回 [`ScanError`]。

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::types::{Float32, Float64, Rat};
use crate::value::SqlValue;

/// 扫描/解析错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error("cannot scan {found} into {expected}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("cannot scan NULL into {0}, use Option<{0}>")]
    UnexpectedNull(&'static str),
    #[error("value out of range for {0}")]
    OutOfRange(&'static str),
    #[error("failed to parse datetime {0:?}")]
    ParseDateTime(String),
    #[error("failed to parse decimal {0:?}")]
    ParseDecimal(String),
    #[error("no field at index path {0:?}")]
    UnknownField(Vec<usize>),
}

/// 从结果集单元格构造自身。
pub trait FromSqlValue: Sized {
    fn from_sql_value(value: SqlValue) -> Result<Self, ScanError>;
}

fn mismatch<T>(expected: &'static str, value: &SqlValue) -> Result<T, ScanError> {
    match value {
        SqlValue::Null => Err(ScanError::UnexpectedNull(expected)),
        v => Err(ScanError::TypeMismatch {
            expected,
            found: v.kind_name(),
        }),
    }
}

impl FromSqlValue for SqlValue {
    fn from_sql_value(value: SqlValue) -> Result<Self, ScanError> {
        Ok(value)
    }
}

impl FromSqlValue for bool {
    fn from_sql_value(value: SqlValue) -> Result<Self, ScanError> {
        match value {
            SqlValue::Bool(v) => Ok(v),
            SqlValue::I64(v) => Ok(v != 0),
            SqlValue::U64(v) => Ok(v != 0),
            v => mismatch("bool", &v),
        }
    }
}

macro_rules! scan_int {
    ($($t:ty),+ $(,)?) => {
        $(impl FromSqlValue for $t {
            fn from_sql_value(value: SqlValue) -> Result<Self, ScanError> {
                let name = stringify!($t);
                match value {
                    SqlValue::I64(v) => <$t>::try_from(v).map_err(|_| ScanError::OutOfRange(name)),
                    SqlValue::U64(v) => <$t>::try_from(v).map_err(|_| ScanError::OutOfRange(name)),
                    SqlValue::Bool(v) => Ok(<$t>::from(v)),
                    v => mismatch(name, &v),
                }
            }
        })+
    };
}

scan_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FromSqlValue for f64 {
    fn from_sql_value(value: SqlValue) -> Result<Self, ScanError> {
        match value {
            SqlValue::F64(v) => Ok(v),
            SqlValue::I64(v) => Ok(v as f64),
            SqlValue::U64(v) => Ok(v as f64),
            SqlValue::Decimal(v) => v.to_f64().ok_or(ScanError::OutOfRange("f64")),
            v => mismatch("f64", &v),
        }
    }
}

impl FromSqlValue for f32 {
    fn from_sql_value(value: SqlValue) -> Result<Self, ScanError> {
        f64::from_sql_value(value).map(|v| v as f32)
    }
}

impl FromSqlValue for Float64 {
    fn from_sql_value(value: SqlValue) -> Result<Self, ScanError> {
        f64::from_sql_value(value).map(Float64)
    }
}

impl FromSqlValue for Float32 {
    fn from_sql_value(value: SqlValue) -> Result<Self, ScanError> {
        f32::from_sql_value(value).map(Float32)
    }
}

impl FromSqlValue for String {
    fn from_sql_value(value: SqlValue) -> Result<Self, ScanError> {
        match value {
            SqlValue::String(v) => Ok(v.into_owned()),
            SqlValue::Bytes(v) => String::from_utf8(v).map_err(|_| ScanError::TypeMismatch {
                expected: "String",
                found: "bytes",
            }),
            v => mismatch("String", &v),
        }
    }
}

impl FromSqlValue for Vec<u8> {
    fn from_sql_value(value: SqlValue) -> Result<Self, ScanError> {
        match value {
            SqlValue::Bytes(v) => Ok(v),
            SqlValue::String(v) => Ok(v.into_owned().into_bytes()),
            v => mismatch("Vec<u8>", &v),
        }
    }
}

impl FromSqlValue for OffsetDateTime {
    fn from_sql_value(value: SqlValue) -> Result<Self, ScanError> {
        match value {
            SqlValue::DateTime(v) => Ok(v),
            SqlValue::String(s) => parse_datetime(&s),
            SqlValue::I64(v) => OffsetDateTime::from_unix_timestamp(v)
                .map_err(|_| ScanError::OutOfRange("OffsetDateTime")),
            v => mismatch("OffsetDateTime", &v),
        }
    }
}

/// RFC 3339，或无时区的 `YYYY-MM-DD HH:MM:SS[.fff]`（按 UTC）。
fn parse_datetime(s: &str) -> Result<OffsetDateTime, ScanError> {
    if let Ok(v) = OffsetDateTime::parse(s, &Rfc3339) {
        return Ok(v);
    }
    let plain = format_description!(
        version = 2,
        "[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]]"
    );
    PrimitiveDateTime::parse(s, plain)
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|_| ScanError::ParseDateTime(s.to_string()))
}

impl FromSqlValue for Decimal {
    fn from_sql_value(value: SqlValue) -> Result<Self, ScanError> {
        match value {
            SqlValue::Decimal(v) => Ok(v),
            SqlValue::String(s) => {
                Decimal::from_str(&s).map_err(|_| ScanError::ParseDecimal(s.into_owned()))
            }
            SqlValue::I64(v) => Ok(Decimal::from(v)),
            SqlValue::U64(v) => Ok(Decimal::from(v)),
            SqlValue::F64(v) => Decimal::try_from(v).map_err(|_| ScanError::OutOfRange("Decimal")),
            v => mismatch("Decimal", &v),
        }
    }
}

impl FromSqlValue for Rat {
    fn from_sql_value(value: SqlValue) -> Result<Self, ScanError> {
        Decimal::from_sql_value(value).map(Rat)
    }
}

impl<T: FromSqlValue> FromSqlValue for Option<T> {
    fn from_sql_value(value: SqlValue) -> Result<Self, ScanError> {
        match value {
            SqlValue::Null => Ok(None),
            v => T::from_sql_value(v).map(Some),
        }
    }
}
