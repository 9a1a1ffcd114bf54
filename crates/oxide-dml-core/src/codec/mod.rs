//! Value codecs and the codec registry.
//!
//! A [`Codec`] converts between one domain type and the backend's wire
//! representation: it writes a value into a bind slot, reads a result column
//! back, and declares which backend column types it can satisfy.
//!
//! The [`CodecRegistry`] maps each domain type to exactly one codec. It is
//! built once through [`CodecRegistryBuilder`], then shared read-only.
//!
//! # Example
//!
//! ```rust
//! use oxide_dml_core::codec::CodecRegistry;
//! use oxide_dml_core::value::SqlType;
//!
//! let registry = CodecRegistry::with_defaults();
//! assert_eq!(registry.sql_types_of::<url::Url>().unwrap(), &[SqlType::Varchar]);
//! ```

mod primitive;
mod temporal;
mod uri;

pub use primitive::{
    BigIntCodec, BoolCodec, BytesCodec, DoubleCodec, IntegerCodec, RealCodec, SmallIntCodec,
    StringCodec,
};
pub use temporal::{DateCodec, DateTimeCodec, TimeCodec, TimestampCodec};
pub use uri::UrlCodec;

use core::any::TypeId;
use core::fmt;
use std::collections::HashMap;

use tracing::debug;

use crate::connection::{PreparedStatement, Row};
use crate::error::{BackendError, DecodeError, DmlError, Result};
use crate::expr::{BindValue, Constant, DomainValue};
use crate::schema::TypeTag;
use crate::value::{SqlType, SqlValue};

/// A bidirectional converter for one domain type.
pub trait Codec: Send + Sync + 'static {
    /// The domain type handled by this codec.
    type Value: DomainValue;

    /// Backend column types this codec can be bound to, preferred first.
    fn sql_types(&self) -> &'static [SqlType];

    /// Encodes a value for binding.
    fn to_sql(&self, value: &Self::Value) -> SqlValue;

    /// Decodes a column value; `SqlValue::Null` decodes to `None`.
    fn from_sql(&self, value: SqlValue) -> std::result::Result<Option<Self::Value>, DecodeError>;

    /// Writes `value` into the bind slot at the 1-based `position`.
    fn set_value(
        &self,
        stmt: &mut dyn PreparedStatement,
        position: usize,
        value: &Self::Value,
    ) -> std::result::Result<(), BackendError> {
        stmt.bind(position, self.to_sql(value))
    }

    /// Reads the column at the 0-based `index` of `row`.
    fn get_value(
        &self,
        row: &Row,
        index: usize,
    ) -> std::result::Result<Option<Self::Value>, DecodeError> {
        match row.get(index) {
            Some(value) => self.from_sql(value.clone()),
            None => Err(DecodeError::new(format!(
                "row has {} column(s), no column {index}",
                row.len()
            ))),
        }
    }
}

/// Object-safe view of a [`Codec`], keyed by `TypeId` in the registry.
trait ErasedCodec: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn sql_types(&self) -> &'static [SqlType];

    fn encode(&self, value: &Constant) -> Option<SqlValue>;

    fn set_erased(
        &self,
        stmt: &mut dyn PreparedStatement,
        position: usize,
        value: &Constant,
    ) -> std::result::Result<(), BackendError>;

    fn get_erased(
        &self,
        row: &Row,
        index: usize,
    ) -> std::result::Result<Option<Constant>, DecodeError>;
}

impl<C: Codec> ErasedCodec for C {
    fn type_name(&self) -> &'static str {
        core::any::type_name::<C::Value>()
    }

    fn sql_types(&self) -> &'static [SqlType] {
        Codec::sql_types(self)
    }

    fn encode(&self, value: &Constant) -> Option<SqlValue> {
        value.downcast_ref::<C::Value>().map(|v| self.to_sql(v))
    }

    fn set_erased(
        &self,
        stmt: &mut dyn PreparedStatement,
        position: usize,
        value: &Constant,
    ) -> std::result::Result<(), BackendError> {
        match value.as_any().downcast_ref::<C::Value>() {
            Some(v) => self.set_value(stmt, position, v),
            None => Err(format!(
                "codec for `{}` cannot bind a `{}`",
                ErasedCodec::type_name(self),
                value.type_tag().name()
            )
            .into()),
        }
    }

    fn get_erased(
        &self,
        row: &Row,
        index: usize,
    ) -> std::result::Result<Option<Constant>, DecodeError> {
        Ok(self.get_value(row, index)?.map(Constant::new))
    }
}

/// Immutable mapping from domain types to codecs.
#[derive(Default)]
pub struct CodecRegistry {
    codecs: HashMap<TypeId, Box<dyn ErasedCodec>>,
}

impl CodecRegistry {
    /// Returns an empty builder.
    #[must_use]
    pub fn builder() -> CodecRegistryBuilder {
        CodecRegistryBuilder::default()
    }

    /// Returns a registry holding the built-in codecs.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::builder().with_defaults().build()
    }

    /// Returns whether a codec is registered for `T`.
    #[must_use]
    pub fn contains<T: 'static>(&self) -> bool {
        self.codecs.contains_key(&TypeId::of::<T>())
    }

    /// Returns the number of registered codecs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    /// Returns whether no codec is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    fn lookup(&self, tag: TypeTag) -> Result<&dyn ErasedCodec> {
        self.codecs
            .get(&tag.id())
            .map(|codec| &**codec)
            .ok_or(DmlError::MissingCodec {
                type_name: tag.name(),
            })
    }

    /// Returns the column types declared by the codec for `tag`.
    pub fn sql_types(&self, tag: TypeTag) -> Result<&'static [SqlType]> {
        Ok(self.lookup(tag)?.sql_types())
    }

    /// Returns the column types declared by the codec for `T`.
    pub fn sql_types_of<T: 'static>(&self) -> Result<&'static [SqlType]> {
        self.sql_types(TypeTag::of::<T>())
    }

    /// Returns the column type a NULL of the given domain type binds as.
    pub fn null_type(&self, tag: Option<TypeTag>) -> Result<SqlType> {
        match tag {
            Some(tag) => Ok(self
                .sql_types(tag)?
                .first()
                .copied()
                .unwrap_or(SqlType::Null)),
            None => Ok(SqlType::Null),
        }
    }

    /// Encodes a bind value to its wire form without a statement.
    pub fn encode(&self, value: &BindValue) -> Result<SqlValue> {
        match value {
            BindValue::Null(_) => Ok(SqlValue::Null),
            BindValue::Value(constant) => {
                let tag = constant.type_tag();
                self.lookup(tag)?
                    .encode(constant)
                    .ok_or(DmlError::MissingCodec {
                        type_name: tag.name(),
                    })
            }
        }
    }

    /// Binds `value` at the 1-based `position`.
    ///
    /// The outer error is a configuration problem (no codec); the inner one
    /// comes from the backend and is wrapped by the caller with its SQL text.
    pub(crate) fn bind(
        &self,
        stmt: &mut dyn PreparedStatement,
        position: usize,
        value: &BindValue,
    ) -> Result<std::result::Result<(), BackendError>> {
        match value {
            BindValue::Value(constant) => {
                let codec = self.lookup(constant.type_tag())?;
                Ok(codec.set_erased(stmt, position, constant))
            }
            BindValue::Null(null) => {
                let sql_type = self.null_type(null.type_tag())?;
                Ok(stmt.bind_null(position, sql_type))
            }
        }
    }

    /// Decodes the column at `index` as the domain type named by `tag`.
    pub fn decode_tagged(&self, tag: TypeTag, row: &Row, index: usize) -> Result<Option<Constant>> {
        self.lookup(tag)?
            .get_erased(row, index)
            .map_err(|source| DmlError::Decode {
                type_name: tag.name(),
                index,
                source,
            })
    }

    /// Decodes the column at `index` as a `T`.
    pub fn decode<T: DomainValue + Clone>(&self, row: &Row, index: usize) -> Result<Option<T>> {
        let decoded = self.decode_tagged(TypeTag::of::<T>(), row, index)?;
        Ok(decoded.and_then(|constant| constant.downcast_ref::<T>().cloned()))
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.codecs.values().map(|c| c.type_name()).collect();
        names.sort_unstable();
        f.debug_struct("CodecRegistry").field("types", &names).finish()
    }
}

/// Builder for a [`CodecRegistry`].
#[derive(Default)]
pub struct CodecRegistryBuilder {
    codecs: HashMap<TypeId, Box<dyn ErasedCodec>>,
}

impl CodecRegistryBuilder {
    /// Registers a codec, replacing any codec for the same domain type.
    #[must_use]
    pub fn register<C: Codec>(mut self, codec: C) -> Self {
        let type_id = TypeId::of::<C::Value>();
        if self.codecs.insert(type_id, Box::new(codec)).is_some() {
            debug!(
                type_name = core::any::type_name::<C::Value>(),
                "Replacing registered codec"
            );
        }
        self
    }

    /// Registers the built-in codecs.
    #[must_use]
    pub fn with_defaults(self) -> Self {
        self.register(BoolCodec)
            .register(SmallIntCodec)
            .register(IntegerCodec)
            .register(BigIntCodec)
            .register(RealCodec)
            .register(DoubleCodec)
            .register(StringCodec)
            .register(BytesCodec)
            .register(DateCodec)
            .register(TimeCodec)
            .register(DateTimeCodec)
            .register(TimestampCodec)
            .register(UrlCodec)
    }

    /// Freezes the registry.
    #[must_use]
    pub fn build(self) -> CodecRegistry {
        CodecRegistry {
            codecs: self.codecs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Celsius(f64);

    struct CelsiusCodec;

    impl Codec for CelsiusCodec {
        type Value = Celsius;

        fn sql_types(&self) -> &'static [SqlType] {
            &[SqlType::Double]
        }

        fn to_sql(&self, value: &Celsius) -> SqlValue {
            SqlValue::Float(value.0)
        }

        fn from_sql(
            &self,
            value: SqlValue,
        ) -> std::result::Result<Option<Celsius>, DecodeError> {
            match value {
                SqlValue::Null => Ok(None),
                SqlValue::Float(f) => Ok(Some(Celsius(f))),
                other => Err(DecodeError::unexpected("FLOAT", &other)),
            }
        }
    }

    #[test]
    fn test_defaults_cover_builtin_types() {
        let registry = CodecRegistry::with_defaults();
        assert!(registry.contains::<i64>());
        assert!(registry.contains::<String>());
        assert!(registry.contains::<url::Url>());
        assert!(!registry.contains::<Celsius>());
        assert_eq!(registry.len(), 13);
    }

    #[test]
    fn test_custom_codec_round_trip() {
        let registry = CodecRegistry::builder().register(CelsiusCodec).build();
        let encoded = registry
            .encode(&BindValue::Value(Constant::new(Celsius(21.5))))
            .unwrap();
        assert_eq!(encoded, SqlValue::Float(21.5));

        let row = Row::new(vec![SqlValue::Float(-3.0)]);
        assert_eq!(registry.decode::<Celsius>(&row, 0).unwrap(), Some(Celsius(-3.0)));
    }

    #[test]
    fn test_lookup_is_exact_type() {
        let registry = CodecRegistry::with_defaults();
        let err = registry
            .encode(&BindValue::Value(Constant::new(Celsius(1.0))))
            .unwrap_err();
        assert!(matches!(err, DmlError::MissingCodec { type_name } if type_name.ends_with("Celsius")));
    }

    #[test]
    fn test_null_type_uses_first_declared_type() {
        let registry = CodecRegistry::with_defaults();
        assert_eq!(
            registry.null_type(Some(TypeTag::of::<i64>())).unwrap(),
            SqlType::BigInt
        );
        assert_eq!(registry.null_type(None).unwrap(), SqlType::Null);
        assert!(registry.null_type(Some(TypeTag::of::<Celsius>())).is_err());
    }

    #[test]
    fn test_decode_reports_index_and_type() {
        let registry = CodecRegistry::with_defaults();
        let row = Row::new(vec![SqlValue::Blob(vec![1])]);
        let err = registry.decode::<i64>(&row, 0).unwrap_err();
        assert!(matches!(err, DmlError::Decode { index: 0, .. }));
        let err = registry.decode::<i64>(&row, 4).unwrap_err();
        assert!(matches!(err, DmlError::Decode { index: 4, .. }));
    }

    #[test]
    fn test_second_registration_replaces_first() {
        struct LoudString;

        impl Codec for LoudString {
            type Value = String;

            fn sql_types(&self) -> &'static [SqlType] {
                &[SqlType::Text]
            }

            fn to_sql(&self, value: &String) -> SqlValue {
                SqlValue::Text(value.to_uppercase())
            }

            fn from_sql(
                &self,
                value: SqlValue,
            ) -> std::result::Result<Option<String>, DecodeError> {
                StringCodec.from_sql(value)
            }
        }

        let registry = CodecRegistry::builder()
            .with_defaults()
            .register(LoudString)
            .build();
        let encoded = registry
            .encode(&BindValue::Value(Constant::new(String::from("hi"))))
            .unwrap();
        assert_eq!(encoded, SqlValue::Text(String::from("HI")));
        assert_eq!(registry.sql_types_of::<String>().unwrap(), &[SqlType::Text]);
    }
}
