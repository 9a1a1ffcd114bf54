//! Error types for clause building and execution.

use thiserror::Error;

use crate::value::SqlValue;

/// Error type produced by a backend driver.
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while serializing, binding, or executing DML statements.
#[derive(Debug, Error)]
pub enum DmlError {
    /// A backend call (prepare, bind, execute, release) failed.
    #[error("statement failed: {sql}")]
    Execution {
        /// The SQL text that was attempted.
        sql: String,
        /// The backend's error.
        #[source]
        source: BackendError,
    },

    /// No codec is registered for a bound or decoded domain type.
    #[error("no codec registered for type `{type_name}`")]
    MissingCodec {
        /// Name of the domain type.
        type_name: &'static str,
    },

    /// A result column could not be decoded into its domain type.
    #[error("cannot decode column {index} as `{type_name}`: {source}")]
    Decode {
        /// Name of the domain type.
        type_name: &'static str,
        /// Zero-based column index.
        index: usize,
        /// The codec's error.
        #[source]
        source: DecodeError,
    },

    /// A merge that needs key columns was executed without any.
    #[error("merge into {entity} requires at least one key column")]
    MissingKeys {
        /// The target entity.
        entity: String,
    },

    /// A merge has no column assignments.
    #[error("merge into {entity} has no columns to merge")]
    EmptyMerge {
        /// The target entity.
        entity: String,
    },

    /// `columns()` and `values()` were called with different cardinalities.
    #[error("{columns} column(s) declared for {values} value(s)")]
    ColumnValueMismatch {
        /// Number of declared columns.
        columns: usize,
        /// Number of supplied values.
        values: usize,
    },
}

impl DmlError {
    /// Creates an execution error for the given SQL text.
    pub fn execution(sql: impl Into<String>, source: impl Into<BackendError>) -> Self {
        Self::Execution {
            sql: sql.into(),
            source: source.into(),
        }
    }

    /// Returns the SQL text of an execution error.
    #[must_use]
    pub fn sql(&self) -> Option<&str> {
        match self {
            Self::Execution { sql, .. } => Some(sql),
            _ => None,
        }
    }
}

/// Error returned by a codec that cannot convert a wire value.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct DecodeError {
    message: String,
}

impl DecodeError {
    /// Creates a decode error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Creates a decode error for a value of an unexpected kind.
    #[must_use]
    pub fn unexpected(expected: &str, found: &SqlValue) -> Self {
        Self::new(format!("expected {expected}, found {}", found.kind()))
    }
}

/// Result type alias for DML operations.
pub type Result<T> = std::result::Result<T, DmlError>;
