//! Statement serialization.
//!
//! [`SqlSerializer`] renders statements to dialect SQL text plus the ordered
//! list of [`BindValue`]s for positional binding. Serialization is pure: it
//! never touches a connection, so rendering the same statement twice yields
//! the same text.

use crate::dialect::{Dialect, MergeSyntax};
use crate::expr::{BindValue, Expr, NullExpr, Predicate};
use crate::query::ListSubQuery;
use crate::schema::{ColumnRef, EntityPath};

/// Alias of the source row set in SQL:2003 merges.
const MERGE_SOURCE_ALIAS: &str = "src";

/// A column paired with the value it receives.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// The target column.
    pub column: ColumnRef,
    /// The assigned value.
    pub value: Expr,
}

impl Assignment {
    /// Creates an assignment.
    #[must_use]
    pub const fn new(column: ColumnRef, value: Expr) -> Self {
        Self { column, value }
    }
}

/// Where a merge takes its row from.
#[derive(Debug, Clone, Copy)]
pub enum MergeSource<'a> {
    /// A single row of assigned values.
    Values(&'a [Assignment]),
    /// The rows of a sub-query, mapped positionally onto `columns`.
    SubQuery {
        /// Target columns.
        columns: &'a [ColumnRef],
        /// The source query.
        query: &'a ListSubQuery,
    },
}

impl MergeSource<'_> {
    fn columns(&self) -> Vec<&ColumnRef> {
        match self {
            Self::Values(assignments) => assignments.iter().map(|a| &a.column).collect(),
            Self::SubQuery { columns, .. } => columns.iter().collect(),
        }
    }
}

/// Renders statements for one dialect.
pub struct SqlSerializer<'d> {
    dialect: &'d dyn Dialect,
    sql: String,
    bindings: Vec<BindValue>,
}

impl<'d> SqlSerializer<'d> {
    /// Creates a serializer for the given dialect.
    #[must_use]
    pub fn new(dialect: &'d dyn Dialect) -> Self {
        Self {
            dialect,
            sql: String::new(),
            bindings: vec![],
        }
    }

    /// Returns the SQL rendered so far.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the parameters collected so far, in placeholder order.
    #[must_use]
    pub fn bindings(&self) -> &[BindValue] {
        &self.bindings
    }

    /// Consumes the serializer and returns the SQL and its parameters.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<BindValue>) {
        (self.sql, self.bindings)
    }

    /// Renders `INSERT INTO entity (cols) VALUES (...)`.
    pub fn serialize_for_insert(&mut self, entity: &EntityPath, assignments: &[Assignment]) {
        self.sql.push_str("INSERT INTO ");
        self.push_entity(entity);
        self.sql.push(' ');
        self.push_column_list(assignments.iter().map(|a| &a.column));
        self.sql.push_str(" VALUES ");
        self.push_value_list(assignments);
    }

    /// Renders `UPDATE entity SET ... [WHERE ...]`.
    pub fn serialize_for_update(
        &mut self,
        entity: &EntityPath,
        assignments: &[Assignment],
        predicates: &[Predicate],
    ) {
        self.sql.push_str("UPDATE ");
        self.push_entity(entity);
        self.sql.push_str(" SET ");
        for (i, assignment) in assignments.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            self.push_column(&assignment.column);
            self.sql.push_str(" = ");
            self.push_expr(&assignment.value);
        }
        self.push_where(predicates);
    }

    /// Renders `SELECT projection FROM entity [WHERE ...]`.
    pub fn serialize_query(&mut self, query: &ListSubQuery) {
        self.sql.push_str("SELECT ");
        for (i, expr) in query.projection().iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            self.push_expr(expr);
        }
        self.sql.push_str(" FROM ");
        self.push_entity(query.entity());
        self.push_where(query.predicates());
    }

    /// Renders a merge in the dialect's merge grammar.
    pub fn serialize_for_merge(
        &mut self,
        entity: &EntityPath,
        keys: &[ColumnRef],
        source: MergeSource<'_>,
    ) {
        // a repeated key would make the conflict target invalid
        let mut distinct: Vec<ColumnRef> = Vec::with_capacity(keys.len());
        for key in keys {
            if !distinct.contains(key) {
                distinct.push(key.clone());
            }
        }
        let keys = distinct.as_slice();
        match self.dialect.merge_syntax() {
            MergeSyntax::KeyValues => self.merge_key_values(entity, keys, source),
            MergeSyntax::OnConflict => self.merge_on_conflict(entity, keys, source),
            MergeSyntax::Standard => self.merge_standard(entity, keys, source),
        }
    }

    fn merge_key_values(&mut self, entity: &EntityPath, keys: &[ColumnRef], source: MergeSource<'_>) {
        self.sql.push_str("MERGE INTO ");
        self.push_entity(entity);
        self.sql.push(' ');
        self.push_column_list(source.columns());
        if !keys.is_empty() {
            self.sql.push_str(" KEY ");
            self.push_column_list(keys.iter());
        }
        match source {
            MergeSource::Values(assignments) => {
                self.sql.push_str(" VALUES ");
                self.push_value_list(assignments);
            }
            MergeSource::SubQuery { query, .. } => {
                self.sql.push(' ');
                self.serialize_query(query);
            }
        }
    }

    fn merge_on_conflict(&mut self, entity: &EntityPath, keys: &[ColumnRef], source: MergeSource<'_>) {
        self.sql.push_str("INSERT INTO ");
        self.push_entity(entity);
        self.sql.push(' ');
        self.push_column_list(source.columns());
        match source {
            MergeSource::Values(assignments) => {
                self.sql.push_str(" VALUES ");
                self.push_value_list(assignments);
            }
            MergeSource::SubQuery { query, .. } => {
                self.sql.push(' ');
                self.serialize_query(query);
                // INSERT ... SELECT ... ON CONFLICT is ambiguous without a WHERE
                if query.predicates().is_empty() {
                    self.sql.push_str(" WHERE TRUE");
                }
            }
        }

        if keys.is_empty() {
            self.sql.push_str(" ON CONFLICT DO NOTHING");
            return;
        }
        self.sql.push_str(" ON CONFLICT ");
        self.push_column_list(keys.iter());

        let updates: Vec<String> = source
            .columns()
            .into_iter()
            .filter(|column| !keys.contains(column))
            .map(|column| {
                let name = column.to_sql(self.dialect);
                format!("{name} = excluded.{name}")
            })
            .collect();
        if updates.is_empty() {
            self.sql.push_str(" DO NOTHING");
        } else {
            self.sql.push_str(" DO UPDATE SET ");
            self.sql.push_str(&updates.join(", "));
        }
    }

    fn merge_standard(&mut self, entity: &EntityPath, keys: &[ColumnRef], source: MergeSource<'_>) {
        let target = entity.to_sql(self.dialect);
        let alias = self.dialect.quote_identifier(MERGE_SOURCE_ALIAS);
        let columns: Vec<String> = source
            .columns()
            .into_iter()
            .map(|column| column.to_sql(self.dialect))
            .collect();

        self.sql.push_str("MERGE INTO ");
        self.sql.push_str(&target);
        self.sql.push_str(" USING (");
        match source {
            MergeSource::Values(assignments) => {
                self.sql.push_str("SELECT ");
                for (i, (assignment, name)) in assignments.iter().zip(&columns).enumerate() {
                    if i > 0 {
                        self.sql.push_str(", ");
                    }
                    self.push_expr(&assignment.value);
                    self.sql.push_str(" AS ");
                    self.sql.push_str(name);
                }
                self.sql.push_str(") AS ");
                self.sql.push_str(&alias);
            }
            MergeSource::SubQuery { query, .. } => {
                self.serialize_query(query);
                self.sql.push_str(") AS ");
                self.sql.push_str(&alias);
                self.sql.push_str(" (");
                self.sql.push_str(&columns.join(", "));
                self.sql.push(')');
            }
        }

        self.sql.push_str(" ON (");
        if keys.is_empty() {
            self.sql.push_str("1 = 0");
        }
        let sourced = source.columns();
        for (i, key) in keys.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(" AND ");
            }
            let name = key.to_sql(self.dialect);
            self.sql.push_str(&target);
            self.sql.push('.');
            self.sql.push_str(&name);
            self.sql.push_str(" = ");
            if sourced.contains(&key) {
                self.sql.push_str(&alias);
                self.sql.push('.');
                self.sql.push_str(&name);
            } else {
                // the source row leaves this key NULL
                self.push_binding(BindValue::Null(NullExpr::for_column(key)));
            }
        }
        self.sql.push(')');

        let updates: Vec<String> = source
            .columns()
            .into_iter()
            .filter(|column| !keys.contains(column))
            .map(|column| {
                let name = column.to_sql(self.dialect);
                format!("{name} = {alias}.{name}")
            })
            .collect();
        if !updates.is_empty() {
            self.sql.push_str(" WHEN MATCHED THEN UPDATE SET ");
            self.sql.push_str(&updates.join(", "));
        }

        let inserted: Vec<String> = columns.iter().map(|name| format!("{alias}.{name}")).collect();
        self.sql.push_str(" WHEN NOT MATCHED THEN INSERT (");
        self.sql.push_str(&columns.join(", "));
        self.sql.push_str(") VALUES (");
        self.sql.push_str(&inserted.join(", "));
        self.sql.push(')');
    }

    fn push_entity(&mut self, entity: &EntityPath) {
        let rendered = entity.to_sql(self.dialect);
        self.sql.push_str(&rendered);
    }

    fn push_column(&mut self, column: &ColumnRef) {
        let rendered = column.to_sql(self.dialect);
        self.sql.push_str(&rendered);
    }

    fn push_column_list<'c>(&mut self, columns: impl IntoIterator<Item = &'c ColumnRef>) {
        self.sql.push('(');
        for (i, column) in columns.into_iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            self.push_column(column);
        }
        self.sql.push(')');
    }

    fn push_value_list(&mut self, assignments: &[Assignment]) {
        self.sql.push('(');
        for (i, assignment) in assignments.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            self.push_expr(&assignment.value);
        }
        self.sql.push(')');
    }

    fn push_binding(&mut self, binding: BindValue) {
        self.bindings.push(binding);
        let placeholder = self.dialect.placeholder(self.bindings.len());
        self.sql.push_str(&placeholder);
    }

    fn push_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Constant(constant) => self.push_binding(BindValue::Value(constant.clone())),
            Expr::Null(null) => self.push_binding(BindValue::Null(*null)),
            Expr::Column(column) => self.push_column(column),
            Expr::Raw(sql) => self.sql.push_str(sql),
        }
    }

    fn push_where(&mut self, predicates: &[Predicate]) {
        for (i, predicate) in predicates.iter().enumerate() {
            self.sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            self.push_predicate(predicate);
        }
    }

    fn push_predicate(&mut self, predicate: &Predicate) {
        match predicate {
            Predicate::Eq(column, expr) => {
                self.push_column(column);
                self.sql.push_str(" = ");
                self.push_expr(expr);
            }
            Predicate::IsNull(column) => {
                self.push_column(column);
                self.sql.push_str(" IS NULL");
            }
            Predicate::IsNotNull(column) => {
                self.push_column(column);
                self.sql.push_str(" IS NOT NULL");
            }
            Predicate::In(_, values) if values.is_empty() => {
                // empty IN lists are not valid SQL
                self.sql.push_str("1 = 0");
            }
            Predicate::In(column, values) => {
                self.push_column(column);
                self.sql.push_str(" IN (");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        self.sql.push_str(", ");
                    }
                    self.push_expr(value);
                }
                self.sql.push(')');
            }
        }
    }
}
