//! Codecs for booleans, numbers, text, and bytes.

use crate::error::DecodeError;
use crate::value::{SqlType, SqlValue};

use super::Codec;

type Decoded<T> = Result<Option<T>, DecodeError>;

/// `bool` ↔ BOOLEAN (integers 0/1 are accepted on read).
#[derive(Debug, Default, Clone, Copy)]
pub struct BoolCodec;

impl Codec for BoolCodec {
    type Value = bool;

    fn sql_types(&self) -> &'static [SqlType] {
        &[SqlType::Boolean, SqlType::Integer]
    }

    fn to_sql(&self, value: &bool) -> SqlValue {
        SqlValue::Bool(*value)
    }

    fn from_sql(&self, value: SqlValue) -> Decoded<bool> {
        match value {
            SqlValue::Null => Ok(None),
            SqlValue::Bool(b) => Ok(Some(b)),
            SqlValue::Int(i) => Ok(Some(i != 0)),
            other => Err(DecodeError::unexpected("BOOLEAN", &other)),
        }
    }
}

fn decode_int(value: SqlValue) -> Decoded<i64> {
    match value {
        SqlValue::Null => Ok(None),
        SqlValue::Int(i) => Ok(Some(i)),
        SqlValue::Bool(b) => Ok(Some(i64::from(b))),
        other => Err(DecodeError::unexpected("INTEGER", &other)),
    }
}

fn narrow<T: TryFrom<i64>>(value: Option<i64>, target: &str) -> Decoded<T> {
    value
        .map(|i| {
            T::try_from(i).map_err(|_| DecodeError::new(format!("{i} does not fit in {target}")))
        })
        .transpose()
}

/// `i16` ↔ SMALLINT.
#[derive(Debug, Default, Clone, Copy)]
pub struct SmallIntCodec;

impl Codec for SmallIntCodec {
    type Value = i16;

    fn sql_types(&self) -> &'static [SqlType] {
        &[SqlType::SmallInt]
    }

    fn to_sql(&self, value: &i16) -> SqlValue {
        SqlValue::Int(i64::from(*value))
    }

    fn from_sql(&self, value: SqlValue) -> Decoded<i16> {
        narrow(decode_int(value)?, "i16")
    }
}

/// `i32` ↔ INTEGER.
#[derive(Debug, Default, Clone, Copy)]
pub struct IntegerCodec;

impl Codec for IntegerCodec {
    type Value = i32;

    fn sql_types(&self) -> &'static [SqlType] {
        &[SqlType::Integer]
    }

    fn to_sql(&self, value: &i32) -> SqlValue {
        SqlValue::Int(i64::from(*value))
    }

    fn from_sql(&self, value: SqlValue) -> Decoded<i32> {
        narrow(decode_int(value)?, "i32")
    }
}

/// `i64` ↔ BIGINT.
#[derive(Debug, Default, Clone, Copy)]
pub struct BigIntCodec;

impl Codec for BigIntCodec {
    type Value = i64;

    fn sql_types(&self) -> &'static [SqlType] {
        &[SqlType::BigInt, SqlType::Integer]
    }

    fn to_sql(&self, value: &i64) -> SqlValue {
        SqlValue::Int(*value)
    }

    fn from_sql(&self, value: SqlValue) -> Decoded<i64> {
        decode_int(value)
    }
}

#[allow(clippy::cast_precision_loss)]
fn decode_float(value: SqlValue) -> Decoded<f64> {
    match value {
        SqlValue::Null => Ok(None),
        SqlValue::Float(f) => Ok(Some(f)),
        SqlValue::Int(i) => Ok(Some(i as f64)),
        other => Err(DecodeError::unexpected("FLOAT", &other)),
    }
}

/// `f32` ↔ REAL.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealCodec;

impl Codec for RealCodec {
    type Value = f32;

    fn sql_types(&self) -> &'static [SqlType] {
        &[SqlType::Real]
    }

    fn to_sql(&self, value: &f32) -> SqlValue {
        SqlValue::Float(f64::from(*value))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_sql(&self, value: SqlValue) -> Decoded<f32> {
        Ok(decode_float(value)?.map(|f| f as f32))
    }
}

/// `f64` ↔ DOUBLE PRECISION.
#[derive(Debug, Default, Clone, Copy)]
pub struct DoubleCodec;

impl Codec for DoubleCodec {
    type Value = f64;

    fn sql_types(&self) -> &'static [SqlType] {
        &[SqlType::Double, SqlType::Real]
    }

    fn to_sql(&self, value: &f64) -> SqlValue {
        SqlValue::Float(*value)
    }

    fn from_sql(&self, value: SqlValue) -> Decoded<f64> {
        decode_float(value)
    }
}

/// `String` ↔ VARCHAR / TEXT.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringCodec;

impl Codec for StringCodec {
    type Value = String;

    fn sql_types(&self) -> &'static [SqlType] {
        &[SqlType::Varchar, SqlType::Text]
    }

    fn to_sql(&self, value: &String) -> SqlValue {
        SqlValue::Text(value.clone())
    }

    fn from_sql(&self, value: SqlValue) -> Decoded<String> {
        match value {
            SqlValue::Null => Ok(None),
            SqlValue::Text(s) => Ok(Some(s)),
            other => Err(DecodeError::unexpected("TEXT", &other)),
        }
    }
}

/// `Vec<u8>` ↔ BLOB.
#[derive(Debug, Default, Clone, Copy)]
pub struct BytesCodec;

impl Codec for BytesCodec {
    type Value = Vec<u8>;

    fn sql_types(&self) -> &'static [SqlType] {
        &[SqlType::Blob]
    }

    fn to_sql(&self, value: &Vec<u8>) -> SqlValue {
        SqlValue::Blob(value.clone())
    }

    fn from_sql(&self, value: SqlValue) -> Decoded<Vec<u8>> {
        match value {
            SqlValue::Null => Ok(None),
            SqlValue::Blob(b) => Ok(Some(b)),
            SqlValue::Text(s) => Ok(Some(s.into_bytes())),
            other => Err(DecodeError::unexpected("BLOB", &other)),
        }
    }
}
