//! Data-modifying clause builders.
//!
//! Each builder is bound to a connection, a [`Configuration`] and a target
//! entity. It accumulates `(column, value)` assignments in call order and is
//! consumed by `execute`, which returns the affected row count. `Display`
//! renders the statement without touching the connection.
//!
//! # Example
//!
//! ```rust,ignore
//! use oxide_dml_core::{Configuration, SqlMergeClause};
//!
//! let rows = SqlMergeClause::new(&mut conn, config, Survey::entity())
//!     .keys(&[&SurveyEntity::id()])
//!     .set(&SurveyEntity::id(), 5_i64)
//!     .set(&SurveyEntity::name(), String::from("x"))
//!     .execute()?;
//! ```
//!
//! [`Configuration`]: crate::config::Configuration

mod insert;
mod merge;
mod update;

pub use insert::SqlInsertClause;
pub use merge::SqlMergeClause;
pub use update::SqlUpdateClause;

use crate::expr::{Expr, NullExpr, ToExpr};
use crate::schema::ColumnRef;
use crate::serializer::Assignment;

/// Builds the assignment for `set(path, value)`: `None` becomes a NULL typed
/// after the column.
fn typed_assignment<T: ToExpr>(column: &ColumnRef, value: Option<T>) -> Assignment {
    let value = match value {
        Some(value) => value.to_expr(),
        None => Expr::Null(NullExpr::for_column(column)),
    };
    Assignment::new(column.clone(), value)
}
