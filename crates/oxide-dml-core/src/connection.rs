//! Backend connection abstraction.
//!
//! A backend adapter implements [`Connection`] and [`PreparedStatement`].
//! Parameter positions are 1-based, result column indices 0-based.

use crate::error::BackendError;
use crate::value::{SqlType, SqlValue};

/// A live backend connection able to prepare statements.
pub trait Connection {
    /// Prepares a statement.
    fn prepare<'s>(
        &'s mut self,
        sql: &str,
    ) -> Result<Box<dyn PreparedStatement + 's>, BackendError>;
}

/// A prepared statement owned by the execution engine for one call.
pub trait PreparedStatement {
    /// Binds a value at the 1-based `position`.
    fn bind(&mut self, position: usize, value: SqlValue) -> Result<(), BackendError>;

    /// Binds a SQL NULL of the given column type at the 1-based `position`.
    fn bind_null(&mut self, position: usize, sql_type: SqlType) -> Result<(), BackendError>;

    /// Executes a data-modifying statement and returns the affected row count.
    fn execute_update(&mut self) -> Result<u64, BackendError>;

    /// Executes a query and collects its rows.
    fn execute_query(&mut self) -> Result<Vec<Row>, BackendError>;

    /// Releases the statement.
    fn close(self: Box<Self>) -> Result<(), BackendError>;
}

/// One result row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: Vec<SqlValue>,
}

impl Row {
    /// Creates a row from its column values.
    #[must_use]
    pub const fn new(values: Vec<SqlValue>) -> Self {
        Self { values }
    }

    /// Returns the value at the 0-based column `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Vec<SqlValue>> for Row {
    fn from(values: Vec<SqlValue>) -> Self {
        Self::new(values)
    }
}
