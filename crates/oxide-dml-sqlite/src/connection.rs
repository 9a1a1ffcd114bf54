//! `rusqlite` backend for the connection abstraction.

use oxide_dml_core::connection::{Connection, PreparedStatement, Row};
use oxide_dml_core::error::BackendError;
use oxide_dml_core::value::{SqlType, SqlValue};
use rusqlite::types::Value;
use tracing::trace;

/// Adapts a borrowed `rusqlite::Connection` (or a `Transaction`, which
/// dereferences to one) to [`Connection`].
#[derive(Debug, Clone, Copy)]
pub struct SqliteConnection<'a> {
    conn: &'a rusqlite::Connection,
}

impl<'a> SqliteConnection<'a> {
    /// Wraps a connection.
    #[must_use]
    pub const fn new(conn: &'a rusqlite::Connection) -> Self {
        Self { conn }
    }
}

impl<'a> From<&'a rusqlite::Connection> for SqliteConnection<'a> {
    fn from(conn: &'a rusqlite::Connection) -> Self {
        Self::new(conn)
    }
}

impl Connection for SqliteConnection<'_> {
    fn prepare<'s>(
        &'s mut self,
        sql: &str,
    ) -> Result<Box<dyn PreparedStatement + 's>, BackendError> {
        let stmt = self.conn.prepare(sql)?;
        Ok(Box::new(SqliteStatement { stmt }))
    }
}

struct SqliteStatement<'conn> {
    stmt: rusqlite::Statement<'conn>,
}

impl PreparedStatement for SqliteStatement<'_> {
    fn bind(&mut self, position: usize, value: SqlValue) -> Result<(), BackendError> {
        self.stmt.raw_bind_parameter(position, to_sqlite(value))?;
        Ok(())
    }

    fn bind_null(&mut self, position: usize, sql_type: SqlType) -> Result<(), BackendError> {
        // SQLite NULLs are untyped
        trace!(position, %sql_type, "Binding NULL");
        self.stmt.raw_bind_parameter(position, Value::Null)?;
        Ok(())
    }

    fn execute_update(&mut self) -> Result<u64, BackendError> {
        let changed = self.stmt.raw_execute()?;
        Ok(u64::try_from(changed)?)
    }

    fn execute_query(&mut self) -> Result<Vec<Row>, BackendError> {
        let column_count = self.stmt.column_count();
        let mut rows = self.stmt.raw_query();
        let mut collected = vec![];
        while let Some(row) = rows.next()? {
            let values = (0..column_count)
                .map(|index| row.get::<_, Value>(index).map(from_sqlite))
                .collect::<Result<Vec<_>, _>>()?;
            collected.push(Row::new(values));
        }
        Ok(collected)
    }

    fn close(self: Box<Self>) -> Result<(), BackendError> {
        self.stmt.finalize()?;
        Ok(())
    }
}

/// Converts a wire value to its SQLite storage class.
#[must_use]
pub fn to_sqlite(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Bool(b) => Value::Integer(i64::from(b)),
        SqlValue::Int(i) => Value::Integer(i),
        SqlValue::Float(f) => Value::Real(f),
        SqlValue::Text(s) => Value::Text(s),
        SqlValue::Blob(b) => Value::Blob(b),
    }
}

/// Converts a SQLite value back to the wire representation.
#[must_use]
pub fn from_sqlite(value: Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(i) => SqlValue::Int(i),
        Value::Real(f) => SqlValue::Float(f),
        Value::Text(s) => SqlValue::Text(s),
        Value::Blob(b) => SqlValue::Blob(b),
    }
}
