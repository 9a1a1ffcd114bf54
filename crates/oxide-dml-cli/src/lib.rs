//! Library side of the `oxide-dml` command: argument parsing and the merge
//! commands it runs against SQLite.

pub mod assignment;
pub mod command;
pub mod error;

pub use assignment::{ColumnAssignment, Literal};
pub use command::{execute, plan, MergeRequest, Plan};
pub use error::{CliError, Result};
