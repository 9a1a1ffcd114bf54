//! Typed handles for entities and their columns.
//!
//! A [`Path<T>`] names a column whose values are of domain type `T`. The
//! `#[derive(Entity)]` macro generates one accessor per field returning such
//! a handle, together with an [`Entity`] implementation describing the table.

use core::any::TypeId;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

use crate::dialect::Dialect;

/// Identity of a domain type, used to look up its codec.
#[derive(Debug, Clone, Copy)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    /// Returns the tag of `T`.
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: core::any::type_name::<T>(),
        }
    }

    /// Returns the `TypeId` of the tagged type.
    #[must_use]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the Rust name of the tagged type.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns whether this tag denotes `T`.
    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// The target table of a statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityPath {
    schema: Option<String>,
    table: String,
}

impl EntityPath {
    /// Creates an entity path for an unqualified table.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            schema: None,
            table: table.into(),
        }
    }

    /// Qualifies the table with a schema.
    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Returns the table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns the schema name, if any.
    #[must_use]
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Renders the (possibly schema-qualified) quoted table name.
    #[must_use]
    pub fn to_sql(&self, dialect: &dyn Dialect) -> String {
        match &self.schema {
            Some(schema) => format!(
                "{}.{}",
                dialect.quote_identifier(schema),
                dialect.quote_identifier(&self.table)
            ),
            None => dialect.quote_identifier(&self.table),
        }
    }
}

impl fmt::Display for EntityPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{schema}.{}", self.table),
            None => f.write_str(&self.table),
        }
    }
}

impl From<&str> for EntityPath {
    fn from(table: &str) -> Self {
        Self::new(table)
    }
}

/// An untyped column reference carrying the tag of its domain type.
///
/// Two references are equal when they name the same column.
#[derive(Debug, Clone)]
pub struct ColumnRef {
    name: String,
    tag: TypeTag,
    nullable: bool,
}

impl ColumnRef {
    /// Creates a reference to a column holding values of `T`.
    #[must_use]
    pub fn new<T: 'static>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: TypeTag::of::<T>(),
            nullable: false,
        }
    }

    /// Returns the column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the tag of the column's domain type.
    #[must_use]
    pub const fn type_tag(&self) -> TypeTag {
        self.tag
    }

    /// Returns whether the column accepts NULL.
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Renders the quoted column name.
    #[must_use]
    pub fn to_sql(&self, dialect: &dyn Dialect) -> String {
        dialect.quote_identifier(&self.name)
    }
}

impl PartialEq for ColumnRef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ColumnRef {}

/// A typed column handle.
pub struct Path<T> {
    column: ColumnRef,
    _type: PhantomData<fn() -> T>,
}

impl<T: 'static> Path<T> {
    /// Creates a handle to a column holding values of `T`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            column: ColumnRef::new::<T>(name),
            _type: PhantomData,
        }
    }
}

impl<T> Path<T> {
    /// Marks the column as nullable.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.column.nullable = true;
        self
    }

    /// Returns the untyped column reference.
    #[must_use]
    pub const fn column(&self) -> &ColumnRef {
        &self.column
    }

    /// Returns the column name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.column.name()
    }
}

impl<T> Clone for Path<T> {
    fn clone(&self) -> Self {
        Self {
            column: self.column.clone(),
            _type: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Path<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Path")
            .field("name", &self.column.name)
            .field("type", &self.column.tag.name())
            .finish()
    }
}

/// Anything that designates a column; lets heterogeneous typed handles be
/// passed together as `&[&dyn ColumnPath]`.
pub trait ColumnPath {
    /// Returns the untyped column reference.
    fn column_ref(&self) -> &ColumnRef;
}

impl<T> ColumnPath for Path<T> {
    fn column_ref(&self) -> &ColumnRef {
        &self.column
    }
}

impl ColumnPath for ColumnRef {
    fn column_ref(&self) -> &ColumnRef {
        self
    }
}

/// Table metadata, implemented by `#[derive(Entity)]`.
pub trait Entity {
    /// The SQL table name.
    const TABLE: &'static str;

    /// The schema qualifying the table, if any.
    const SCHEMA: Option<&'static str>;

    /// All column names, in field order.
    const COLUMNS: &'static [&'static str];

    /// Returns the entity path of the table.
    #[must_use]
    fn entity() -> EntityPath {
        let path = EntityPath::new(Self::TABLE);
        match Self::SCHEMA {
            Some(schema) => path.with_schema(schema),
            None => path,
        }
    }
}
