//! URL codec.

use url::Url;

use crate::error::DecodeError;
use crate::value::{SqlType, SqlValue};

use super::Codec;

/// `url::Url` ↔ VARCHAR.
#[derive(Debug, Default, Clone, Copy)]
pub struct UrlCodec;

impl Codec for UrlCodec {
    type Value = Url;

    fn sql_types(&self) -> &'static [SqlType] {
        &[SqlType::Varchar]
    }

    fn to_sql(&self, value: &Url) -> SqlValue {
        SqlValue::Text(String::from(value.as_str()))
    }

    fn from_sql(&self, value: SqlValue) -> Result<Option<Url>, DecodeError> {
        match value {
            SqlValue::Null => Ok(None),
            SqlValue::Text(s) => Url::parse(&s)
                .map(Some)
                .map_err(|e| DecodeError::new(format!("invalid URL '{s}': {e}"))),
            other => Err(DecodeError::unexpected("VARCHAR", &other)),
        }
    }
}
