//! INSERT clause.

use core::fmt;

use crate::config::Configuration;
use crate::connection::Connection;
use crate::error::Result;
use crate::execute::execute_update;
use crate::expr::{BindValue, Expr, NullExpr, ToExpr};
use crate::schema::{ColumnPath, EntityPath, Path};
use crate::serializer::{Assignment, SqlSerializer};

use super::typed_assignment;

/// Builder for `INSERT INTO entity (cols) VALUES (...)`.
pub struct SqlInsertClause<'c, C: Connection + ?Sized> {
    connection: &'c mut C,
    configuration: Configuration,
    entity: EntityPath,
    assignments: Vec<Assignment>,
}

impl<'c, C: Connection + ?Sized> SqlInsertClause<'c, C> {
    /// Creates an insert into `entity`.
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
        }
    }

    /// Assigns a value; `None` inserts a NULL typed after the column.
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

    /// Returns the assignments in call order.
    #[must_use]
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    fn serialize(&self) -> (String, Vec<BindValue>) {
        let mut serializer = SqlSerializer::new(self.configuration.dialect());
        serializer.serialize_for_insert(&self.entity, &self.assignments);
        serializer.into_parts()
    }

    /// Executes the insert and returns the number of inserted rows.
    pub fn execute(self) -> Result<u64> {
        let (sql, bindings) = self.serialize();
        execute_update(self.connection, &self.configuration, &sql, &bindings)
    }
}

impl<C: Connection + ?Sized> fmt::Display for SqlInsertClause<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize().0)
    }
}
