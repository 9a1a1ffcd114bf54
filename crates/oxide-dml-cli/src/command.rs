//! Planning and running a merge described on the command line.

use oxide_dml_core::serializer::{Assignment, MergeSource, SqlSerializer};
use oxide_dml_core::{
    ColumnRef, Configuration, EntityPath, Expr, MergeStrategy, NullExpr, SqlMergeClause, SqlValue,
};
use oxide_dml_sqlite::{SqliteConnection, SqliteDialect};
use serde::Serialize;
use tracing::{debug, info};

use crate::assignment::{ColumnAssignment, Literal};
use crate::error::{CliError, Result};

/// A merge of one row into a table.
#[derive(Debug, Clone)]
pub struct MergeRequest {
    /// Target table.
    pub table: String,
    /// Optional schema qualifying the table.
    pub schema: Option<String>,
    /// Names of the key columns.
    pub keys: Vec<String>,
    /// Assigned columns, in order.
    pub assignments: Vec<ColumnAssignment>,
    /// Emulate the merge with a probe and an UPDATE or INSERT.
    pub composite: bool,
}

impl MergeRequest {
    fn entity(&self) -> EntityPath {
        let entity = EntityPath::new(self.table.as_str());
        match &self.schema {
            Some(schema) => entity.with_schema(schema.as_str()),
            None => entity,
        }
    }

    fn configuration(&self) -> Configuration {
        Configuration::new(SqliteDialect::new().with_native_merge(!self.composite))
    }

    /// Key columns, typed after the assignment of the same name.
    fn key_columns(&self) -> Result<Vec<ColumnRef>> {
        self.keys
            .iter()
            .map(|key| {
                self.assignments
                    .iter()
                    .find(|a| a.column() == key)
                    .map(ColumnAssignment::column_ref)
                    .ok_or_else(|| CliError::UnassignedKey(key.clone()))
            })
            .collect()
    }

    fn typed_assignments(&self) -> Vec<Assignment> {
        self.assignments
            .iter()
            .map(|a| {
                let column = a.column_ref();
                let value = match a.literal() {
                    Literal::Null => Expr::Null(NullExpr::for_column(&column)),
                    _ => a.expr(),
                };
                Assignment::new(column, value)
            })
            .collect()
    }
}

/// The statement a merge renders to, with its encoded parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    /// `native` or `composite`.
    pub strategy: &'static str,
    /// The merge statement.
    pub sql: String,
    /// Parameters in binding order.
    pub parameters: Vec<SqlValue>,
}

/// Renders the merge without touching a database.
///
/// A composite plan shows the single-statement form; the probe and the
/// UPDATE or INSERT it leads to depend on the table's contents.
pub fn plan(request: &MergeRequest) -> Result<Plan> {
    let configuration = request.configuration();
    let keys = request.key_columns()?;
    let assignments = request.typed_assignments();

    let mut serializer = SqlSerializer::new(configuration.dialect());
    serializer.serialize_for_merge(&request.entity(), &keys, MergeSource::Values(&assignments));
    let (sql, bindings) = serializer.into_parts();

    let parameters = bindings
        .iter()
        .map(|b| configuration.registry().encode(b))
        .collect::<oxide_dml_core::Result<Vec<_>>>()?;

    let strategy = match configuration.merge_strategy() {
        MergeStrategy::Native(_) => "native",
        MergeStrategy::Composite => "composite",
    };
    debug!(strategy, sql = %sql, "Planned merge");
    Ok(Plan {
        strategy,
        sql,
        parameters,
    })
}

/// Runs the merge and returns the number of affected rows.
pub fn execute(db: &rusqlite::Connection, request: &MergeRequest) -> Result<u64> {
    let keys = request.key_columns()?;
    let key_paths: Vec<&dyn oxide_dml_core::ColumnPath> =
        keys.iter().map(|k| k as &dyn oxide_dml_core::ColumnPath).collect();

    let mut conn = SqliteConnection::new(db);
    let merge = request.assignments.iter().fold(
        SqlMergeClause::new(&mut conn, request.configuration(), request.entity())
            .keys(&key_paths),
        |merge, a| {
            let column = a.column_ref();
            match a.literal() {
                Literal::Null => merge.set_null(&column),
                _ => merge.set_expr(&column, a.expr()),
            }
        },
    );

    let rows = merge.execute()?;
    info!(table = %request.table, rows, "Merged");
    Ok(rows)
}
