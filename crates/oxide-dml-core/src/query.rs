//! Read queries: connection-free sub-query descriptions and the key probe.

use core::fmt;

use crate::config::Configuration;
use crate::connection::Connection;
use crate::dialect::GenericDialect;
use crate::error::Result;
use crate::execute::execute_query;
use crate::expr::{DomainValue, Expr, NullExpr, Predicate};
use crate::schema::{ColumnPath, ColumnRef, EntityPath, Path};
use crate::serializer::SqlSerializer;

/// A `SELECT projection FROM entity WHERE ...` description.
///
/// Used as the row source of a merge (`SqlMergeClause::select`) and as the
/// shape of the probe issued by [`SqlQuery`].
#[derive(Debug, Clone, PartialEq)]
pub struct ListSubQuery {
    entity: EntityPath,
    predicates: Vec<Predicate>,
    projection: Vec<Expr>,
}

impl ListSubQuery {
    /// Starts a query over `entity`.
    #[must_use]
    pub fn new(entity: impl Into<EntityPath>) -> Self {
        Self {
            entity: entity.into(),
            predicates: vec![],
            projection: vec![],
        }
    }

    /// Adds a predicate; predicates are combined with AND.
    #[must_use]
    pub fn where_(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Appends a projected column.
    #[must_use]
    pub fn column(mut self, column: &dyn ColumnPath) -> Self {
        self.projection.push(Expr::Column(column.column_ref().clone()));
        self
    }

    /// Appends projected expressions.
    #[must_use]
    pub fn select(mut self, exprs: impl IntoIterator<Item = Expr>) -> Self {
        self.projection.extend(exprs);
        self
    }

    /// Returns the queried entity.
    #[must_use]
    pub const fn entity(&self) -> &EntityPath {
        &self.entity
    }

    /// Returns the predicates.
    #[must_use]
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Returns the projected expressions.
    #[must_use]
    pub fn projection(&self) -> &[Expr] {
        &self.projection
    }
}

impl fmt::Display for ListSubQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut serializer = SqlSerializer::new(&GenericDialect);
        serializer.serialize_query(self);
        f.write_str(serializer.sql())
    }
}

/// A query bound to a connection, returning one projected column.
pub struct SqlQuery<'c, C: Connection + ?Sized> {
    connection: &'c mut C,
    configuration: Configuration,
    query: ListSubQuery,
}

impl<'c, C: Connection + ?Sized> SqlQuery<'c, C> {
    /// Creates a query over `entity`.
    pub fn new(
        connection: &'c mut C,
        configuration: Configuration,
        entity: impl Into<EntityPath>,
    ) -> Self {
        Self {
            connection,
            configuration,
            query: ListSubQuery::new(entity),
        }
    }

    /// Adds a predicate; predicates are combined with AND.
    #[must_use]
    pub fn where_(mut self, predicate: Predicate) -> Self {
        self.query = self.query.where_(predicate);
        self
    }

    /// Runs the query projecting `column` and returns its values in row
    /// order, decoded through the column's codec.
    ///
    /// SQL NULLs come back as a NULL marker typed after the column.
    pub fn list_column(self, column: &ColumnRef) -> Result<Vec<Expr>> {
        let query = self.query.select([Expr::Column(column.clone())]);
        let mut serializer = SqlSerializer::new(self.configuration.dialect());
        serializer.serialize_query(&query);
        let (sql, bindings) = serializer.into_parts();

        let rows = execute_query(self.connection, &self.configuration, &sql, &bindings)?;
        let registry = self.configuration.registry();
        rows.iter()
            .map(|row| -> Result<Expr> {
                Ok(registry
                    .decode_tagged(column.type_tag(), row, 0)?
                    .map_or_else(|| Expr::Null(NullExpr::for_column(column)), Expr::Constant))
            })
            .collect()
    }

    /// Runs the query projecting `path` and returns the decoded values.
    pub fn list<T: DomainValue + Clone>(self, path: &Path<T>) -> Result<Vec<Option<T>>> {
        let values = self.list_column(path.column())?;
        Ok(values
            .into_iter()
            .map(|expr| match expr {
                Expr::Constant(constant) => constant.downcast_ref::<T>().cloned(),
                _ => None,
            })
            .collect())
    }
}

impl<C: Connection + ?Sized> fmt::Display for SqlQuery<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut serializer = SqlSerializer::new(self.configuration.dialect());
        serializer.serialize_query(&self.query);
        f.write_str(serializer.sql())
    }
}
