//! UPDATE clause.

use core::fmt;

use crate::config::Configuration;
use crate::connection::Connection;
use crate::error::Result;
use crate::execute::execute_update;
use crate::expr::{BindValue, Expr, NullExpr, Predicate, ToExpr};
use crate::schema::{ColumnPath, EntityPath, Path};
use crate::serializer::{Assignment, SqlSerializer};

use super::typed_assignment;

/// Builder for `UPDATE entity SET ... WHERE ...`.
///
/// Without predicates every row of the entity is updated.
pub struct SqlUpdateClause<'c, C: Connection + ?Sized> {
    connection: &'c mut C,
    configuration: Configuration,
    entity: EntityPath,
    assignments: Vec<Assignment>,
    predicates: Vec<Predicate>,
}

impl<'c, C: Connection + ?Sized> SqlUpdateClause<'c, C> {
    /// Creates an update of `entity`.
    pub fn new(
        connection: &'c mut C,
        configuration: Configuration,
        entity: impl Into<EntityPath>,
    ) -> Self {
        Self {
            connection,
            configuration,
            entity: entity.into(),
            assignments: vec![],
            predicates: vec![],
        }
    }

    /// Assigns a value; `None` sets a NULL typed after the column.
    #[must_use]
    pub fn set<T: ToExpr>(mut self, path: &Path<T>, value: impl Into<Option<T>>) -> Self {
        self.assignments
            .push(typed_assignment(path.column(), value.into()));
        self
    }

    /// Assigns SQL NULL.
    #[must_use]
    pub fn set_null(self, path: &dyn ColumnPath) -> Self {
        let null = Expr::Null(NullExpr::for_column(path.column_ref()));
        self.set_expr(path, null)
    }

    /// Assigns an arbitrary expression.
    #[must_use]
    pub fn set_expr(mut self, path: &dyn ColumnPath, expr: Expr) -> Self {
        self.assignments
            .push(Assignment::new(path.column_ref().clone(), expr));
        self
    }

    /// Adds a predicate; predicates are combined with AND.
    #[must_use]
    pub fn where_(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Returns the assignments in call order.
    #[must_use]
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    fn serialize(&self) -> (String, Vec<BindValue>) {
        let mut serializer = SqlSerializer::new(self.configuration.dialect());
        serializer.serialize_for_update(&self.entity, &self.assignments, &self.predicates);
        serializer.into_parts()
    }

    /// Executes the update and returns the number of updated rows.
    pub fn execute(self) -> Result<u64> {
        let (sql, bindings) = self.serialize();
        execute_update(self.connection, &self.configuration, &sql, &bindings)
    }
}

impl<C: Connection + ?Sized> fmt::Display for SqlUpdateClause<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize().0)
    }
}
