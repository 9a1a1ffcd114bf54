//! # oxide-dml-sqlite
//!
//! SQLite support for `oxide-dml-core`: the [`SqliteDialect`] and a
//! synchronous [`rusqlite`] backend, [`SqliteConnection`].
//!
//! # How SQLite differs from other dialects
//!
//! - **[UPSERT]**: SQLite supports `INSERT ... ON CONFLICT (keys) DO UPDATE
//!   SET ...` (since SQLite 3.24.0), which is how merges run natively. The
//!   conflict target has to match a PRIMARY KEY or UNIQUE constraint.
//! - **`INSERT ... SELECT ... ON CONFLICT`**: the parser needs a WHERE clause
//!   on the SELECT to resolve an ambiguity; merges from a sub-query add
//!   `WHERE TRUE` when the sub-query has no predicate.
//! - **[Type affinity]**: SQLite NULLs are untyped, and booleans are stored
//!   as integers 0 and 1.
//!
//! [UPSERT]: https://www.sqlite.org/lang_upsert.html
//! [Type affinity]: https://www.sqlite.org/datatype3.html
//!
//! ## Example
//!
//! ```rust
//! use oxide_dml_core::{Configuration, Path, SqlMergeClause};
//! use oxide_dml_sqlite::{SqliteConnection, SqliteDialect};
//!
//! let db = rusqlite::Connection::open_in_memory().unwrap();
//! db.execute_batch("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)").unwrap();
//!
//! let id = Path::<i64>::new("id");
//! let name = Path::<String>::new("name");
//! let mut conn = SqliteConnection::new(&db);
//!
//! let rows = SqlMergeClause::new(&mut conn, Configuration::new(SqliteDialect::new()), "users")
//!     .keys(&[&id])
//!     .set(&id, 1_i64)
//!     .set(&name, String::from("Alice"))
//!     .execute()
//!     .unwrap();
//! assert_eq!(rows, 1);
//! ```

mod connection;
mod dialect;

pub use connection::{from_sqlite, to_sqlite, SqliteConnection};
pub use dialect::SqliteDialect;
