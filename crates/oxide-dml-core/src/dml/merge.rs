//! MERGE clause with dialect-aware fallback.
//!
//! When the dialect runs merges natively the clause renders one statement in
//! the dialect's merge grammar. Otherwise it probes the target by the
//! assigned values, then delegates to [`SqlUpdateClause`] when rows matched
//! or to [`SqlInsertClause`] when none did. The probe and the chosen write are
//! two separate round trips; wrap them in a transaction when atomicity
//! matters.

use core::fmt;
use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::config::Configuration;
use crate::connection::Connection;
use crate::dialect::{MergeStrategy, MergeSyntax};
use crate::error::{DmlError, Result};
use crate::execute::execute_update;
use crate::expr::{BindValue, Expr, NullExpr, Predicate, ToExpr};
use crate::query::{ListSubQuery, SqlQuery};
use crate::schema::{ColumnPath, ColumnRef, EntityPath, Path};
use crate::serializer::{Assignment, MergeSource, SqlSerializer};

use super::{typed_assignment, SqlInsertClause, SqlUpdateClause};

/// Builder for a merge (upsert) into one entity.
pub struct SqlMergeClause<'c, C: Connection + ?Sized> {
    connection: &'c mut C,
    configuration: Configuration,
    entity: EntityPath,
    keys: Vec<ColumnRef>,
    assignments: Vec<Assignment>,
    // declared through `columns`, waiting for `values`
    pending: VecDeque<ColumnRef>,
    unpaired_values: usize,
    sub_query: Option<ListSubQuery>,
}

impl<'c, C: Connection + ?Sized> SqlMergeClause<'c, C> {
    /// Creates a merge into `entity`.
    pub fn new(
        connection: &'c mut C,
        configuration: Configuration,
        entity: impl Into<EntityPath>,
    ) -> Self {
        Self {
            connection,
            configuration,
            entity: entity.into(),
            keys: vec![],
            assignments: vec![],
            pending: VecDeque::new(),
            unpaired_values: 0,
            sub_query: None,
        }
    }

    /// Appends key columns. Duplicates are kept.
    #[must_use]
    pub fn keys(mut self, paths: &[&dyn ColumnPath]) -> Self {
        self.keys
            .extend(paths.iter().map(|path| path.column_ref().clone()));
        self
    }

    /// Assigns a value; `None` merges a NULL typed after the column.
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

    /// Declares target columns, to be paired in order with later
    /// [`value`](Self::value) or [`values`](Self::values) calls, or with the
    /// projection of a [`select`](Self::select) sub-query.
    #[must_use]
    pub fn columns(mut self, paths: &[&dyn ColumnPath]) -> Self {
        self.pending
            .extend(paths.iter().map(|path| path.column_ref().clone()));
        self
    }

    /// Supplies the value of the next declared column.
    ///
    /// Expressions are used verbatim, plain values become constants, and an
    /// untyped NULL takes the type of the column it is paired with.
    #[must_use]
    pub fn value(mut self, value: impl ToExpr) -> Self {
        let expr = value.to_expr();
        match self.pending.pop_front() {
            Some(column) => {
                let expr = match expr {
                    Expr::Null(null) if null.type_tag().is_none() => {
                        Expr::Null(NullExpr::for_column(&column))
                    }
                    other => other,
                };
                self.assignments.push(Assignment::new(column, expr));
            }
            None => self.unpaired_values += 1,
        }
        self
    }

    /// Supplies values for the next declared columns, in order.
    #[must_use]
    pub fn values<V: ToExpr>(self, values: impl IntoIterator<Item = V>) -> Self {
        values
            .into_iter()
            .fold(self, |clause, value| clause.value(value))
    }

    /// Takes the merged rows from a sub-query instead of assigned values.
    ///
    /// Only native merges use the sub-query; the composite fallback ignores
    /// it.
    #[must_use]
    pub fn select(mut self, sub_query: ListSubQuery) -> Self {
        self.sub_query = Some(sub_query);
        self
    }

    /// Returns the key columns.
    #[must_use]
    pub fn key_columns(&self) -> &[ColumnRef] {
        &self.keys
    }

    /// Returns the paired assignments in call order.
    #[must_use]
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Executes the merge and returns the affected row count.
    ///
    /// On the composite path this is the count reported by whichever of the
    /// UPDATE or INSERT ran.
    ///
    /// # Errors
    ///
    /// - [`DmlError::ColumnValueMismatch`] when declared columns and supplied
    ///   values do not pair up.
    /// - [`DmlError::MissingKeys`] when the chosen path needs key columns.
    /// - [`DmlError::EmptyMerge`] when nothing is assigned.
    /// - [`DmlError::Execution`] when the backend fails.
    pub fn execute(self) -> Result<u64> {
        self.check_pairing()?;
        let strategy = self.configuration.merge_strategy();
        debug!(entity = %self.entity, ?strategy, "Executing merge");
        match strategy {
            MergeStrategy::Native(syntax) => self.execute_native(syntax),
            MergeStrategy::Composite => self.execute_composite(),
        }
    }

    fn check_pairing(&self) -> Result<()> {
        let leftover_columns = if self.sub_query.is_some() {
            0
        } else {
            self.pending.len()
        };
        if leftover_columns > 0 || self.unpaired_values > 0 {
            return Err(DmlError::ColumnValueMismatch {
                columns: self.assignments.len() + self.pending.len(),
                values: self.assignments.len() + self.unpaired_values,
            });
        }
        Ok(())
    }

    fn execute_native(self, syntax: MergeSyntax) -> Result<u64> {
        if syntax.requires_keys() && self.keys.is_empty() {
            return Err(DmlError::MissingKeys {
                entity: self.entity.to_string(),
            });
        }
        if self.assignments.is_empty() && (self.sub_query.is_none() || self.pending.is_empty()) {
            return Err(DmlError::EmptyMerge {
                entity: self.entity.to_string(),
            });
        }
        let (sql, bindings) = self.serialize();
        execute_update(self.connection, &self.configuration, &sql, &bindings)
    }

    fn execute_composite(self) -> Result<u64> {
        let Some(first_key) = self.keys.first().cloned() else {
            return Err(DmlError::MissingKeys {
                entity: self.entity.to_string(),
            });
        };
        if self.assignments.is_empty() {
            return Err(DmlError::EmptyMerge {
                entity: self.entity.to_string(),
            });
        }
        if self.sub_query.is_some() {
            warn!(
                entity = %self.entity,
                "Sub-query source is not supported by the composite merge and is ignored"
            );
        }

        let mut probe = SqlQuery::new(
            &mut *self.connection,
            self.configuration.clone(),
            self.entity.clone(),
        );
        for assignment in &self.assignments {
            let predicate = match &assignment.value {
                Expr::Null(_) => Predicate::IsNull(assignment.column.clone()),
                value => Predicate::Eq(assignment.column.clone(), value.clone()),
            };
            probe = probe.where_(predicate);
        }
        // existence is decided on the first key column alone
        let ids = probe.list_column(&first_key)?;
        debug!(entity = %self.entity, matches = ids.len(), "Merge probe finished");

        if ids.is_empty() {
            let insert = self.assignments.into_iter().fold(
                SqlInsertClause::new(self.connection, self.configuration, self.entity),
                |insert, assignment| insert.set_expr(&assignment.column, assignment.value),
            );
            insert.execute()
        } else {
            let update = self.assignments.into_iter().fold(
                SqlUpdateClause::new(self.connection, self.configuration, self.entity),
                |update, assignment| update.set_expr(&assignment.column, assignment.value),
            );
            update.where_(Predicate::In(first_key, ids)).execute()
        }
    }

    fn serialize(&self) -> (String, Vec<BindValue>) {
        let mut serializer = SqlSerializer::new(self.configuration.dialect());
        match &self.sub_query {
            Some(query) => {
                let columns: Vec<ColumnRef> = self
                    .assignments
                    .iter()
                    .map(|assignment| assignment.column.clone())
                    .chain(self.pending.iter().cloned())
                    .collect();
                serializer.serialize_for_merge(
                    &self.entity,
                    &self.keys,
                    MergeSource::SubQuery {
                        columns: &columns,
                        query,
                    },
                );
            }
            None => serializer.serialize_for_merge(
                &self.entity,
                &self.keys,
                MergeSource::Values(&self.assignments),
            ),
        }
        serializer.into_parts()
    }
}

impl<C: Connection + ?Sized> fmt::Display for SqlMergeClause<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize().0)
    }
}
