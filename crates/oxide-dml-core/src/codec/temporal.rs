//! Codecs for `chrono` date and time types.
//!
//! Values travel as ISO-8601 text, which every backend accepts for its
//! temporal column types.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::error::DecodeError;
use crate::value::{SqlType, SqlValue};

use super::Codec;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S%.f";
const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

fn expect_text(value: SqlValue, expected: &str) -> Result<Option<String>, DecodeError> {
    match value {
        SqlValue::Null => Ok(None),
        SqlValue::Text(s) => Ok(Some(s)),
        other => Err(DecodeError::unexpected(expected, &other)),
    }
}

/// `NaiveDate` ↔ DATE.
#[derive(Debug, Default, Clone, Copy)]
pub struct DateCodec;

impl Codec for DateCodec {
    type Value = NaiveDate;

    fn sql_types(&self) -> &'static [SqlType] {
        &[SqlType::Date]
    }

    fn to_sql(&self, value: &NaiveDate) -> SqlValue {
        SqlValue::Text(value.format(DATE_FORMAT).to_string())
    }

    fn from_sql(&self, value: SqlValue) -> Result<Option<NaiveDate>, DecodeError> {
        expect_text(value, "DATE")?
            .map(|s| {
                NaiveDate::parse_from_str(&s, DATE_FORMAT)
                    .map_err(|e| DecodeError::new(format!("invalid date '{s}': {e}")))
            })
            .transpose()
    }
}

/// `NaiveTime` ↔ TIME.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeCodec;

impl Codec for TimeCodec {
    type Value = NaiveTime;

    fn sql_types(&self) -> &'static [SqlType] {
        &[SqlType::Time]
    }

    fn to_sql(&self, value: &NaiveTime) -> SqlValue {
        SqlValue::Text(value.format(TIME_FORMAT).to_string())
    }

    fn from_sql(&self, value: SqlValue) -> Result<Option<NaiveTime>, DecodeError> {
        expect_text(value, "TIME")?
            .map(|s| {
                NaiveTime::parse_from_str(&s, TIME_FORMAT)
                    .map_err(|e| DecodeError::new(format!("invalid time '{s}': {e}")))
            })
            .transpose()
    }
}

/// `NaiveDateTime` ↔ TIMESTAMP.
#[derive(Debug, Default, Clone, Copy)]
pub struct DateTimeCodec;

impl Codec for DateTimeCodec {
    type Value = NaiveDateTime;

    fn sql_types(&self) -> &'static [SqlType] {
        &[SqlType::Timestamp]
    }

    fn to_sql(&self, value: &NaiveDateTime) -> SqlValue {
        SqlValue::Text(value.format(DATE_TIME_FORMATS[0]).to_string())
    }

    fn from_sql(&self, value: SqlValue) -> Result<Option<NaiveDateTime>, DecodeError> {
        expect_text(value, "TIMESTAMP")?
            .map(|s| {
                DATE_TIME_FORMATS
                    .iter()
                    .find_map(|format| NaiveDateTime::parse_from_str(&s, format).ok())
                    .ok_or_else(|| DecodeError::new(format!("invalid timestamp '{s}'")))
            })
            .transpose()
    }
}

/// `DateTime<Utc>` ↔ TIMESTAMP WITH TIME ZONE (RFC 3339 text, or Unix
/// seconds on read).
#[derive(Debug, Default, Clone, Copy)]
pub struct TimestampCodec;

impl Codec for TimestampCodec {
    type Value = DateTime<Utc>;

    fn sql_types(&self) -> &'static [SqlType] {
        &[SqlType::TimestampWithTimeZone, SqlType::Timestamp]
    }

    fn to_sql(&self, value: &DateTime<Utc>) -> SqlValue {
        SqlValue::Text(value.to_rfc3339())
    }

    fn from_sql(&self, value: SqlValue) -> Result<Option<DateTime<Utc>>, DecodeError> {
        match value {
            SqlValue::Null => Ok(None),
            SqlValue::Int(secs) => DateTime::from_timestamp(secs, 0)
                .map(Some)
                .ok_or_else(|| DecodeError::new(format!("timestamp {secs} out of range"))),
            SqlValue::Text(s) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(|e| DecodeError::new(format!("invalid timestamp '{s}': {e}"))),
            other => Err(DecodeError::unexpected("TIMESTAMP WITH TIME ZONE", &other)),
        }
    }
}
