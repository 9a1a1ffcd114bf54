//! # oxide-dml-core
//!
//! Typed INSERT, UPDATE and MERGE clause builders with dialect-aware merge
//! execution.
//!
//! This crate provides:
//! - Typed column handles ([`Path<T>`]) and expressions
//! - A value codec registry converting domain values to and from the wire
//! - Dialect descriptors and a statement serializer for three merge grammars
//! - A scoped execution engine over an abstract [`Connection`]
//! - [`SqlMergeClause`], which runs a native merge when the dialect has one
//!   and otherwise probes by key and runs an UPDATE or an INSERT
//!
//! ## Rendering a merge
//!
//! Rendering never touches the connection:
//!
//! ```rust
//! use oxide_dml_core::connection::{Connection, PreparedStatement};
//! use oxide_dml_core::dialect::H2Dialect;
//! use oxide_dml_core::error::BackendError;
//! use oxide_dml_core::{Configuration, Path, SqlMergeClause};
//!
//! struct Offline;
//!
//! impl Connection for Offline {
//!     fn prepare<'s>(
//!         &'s mut self,
//!         _sql: &str,
//!     ) -> Result<Box<dyn PreparedStatement + 's>, BackendError> {
//!         Err("offline".into())
//!     }
//! }
//!
//! let id = Path::<i64>::new("id");
//! let name = Path::<String>::new("name");
//!
//! let mut conn = Offline;
//! let merge = SqlMergeClause::new(&mut conn, Configuration::new(H2Dialect::new()), "survey")
//!     .keys(&[&id])
//!     .set(&id, 5_i64)
//!     .set(&name, String::from("x"));
//!
//! assert_eq!(
//!     merge.to_string(),
//!     r#"MERGE INTO "survey" ("id", "name") KEY ("id") VALUES (?, ?)"#
//! );
//! ```
//!
//! ## Typed NULLs
//!
//! `set(&column, None)` is not the same as never setting the column: it
//! binds a SQL NULL typed after the column, and on the composite merge path
//! it probes with `IS NULL`.

pub mod codec;
pub mod config;
pub mod connection;
pub mod dialect;
pub mod dml;
pub mod error;
pub mod execute;
pub mod expr;
pub mod query;
pub mod schema;
pub mod serializer;
pub mod value;

pub use codec::{Codec, CodecRegistry, CodecRegistryBuilder};
pub use config::Configuration;
pub use connection::{Connection, PreparedStatement, Row};
pub use dialect::{Dialect, MergeStrategy, MergeSyntax};
pub use dml::{SqlInsertClause, SqlMergeClause, SqlUpdateClause};
pub use error::{DmlError, Result};
pub use expr::{BindValue, Constant, Expr, NullExpr, Predicate, ToExpr};
pub use query::{ListSubQuery, SqlQuery};
pub use schema::{ColumnPath, ColumnRef, Entity, EntityPath, Path, TypeTag};
pub use value::{SqlType, SqlValue};
