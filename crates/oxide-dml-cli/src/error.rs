//! Error types for the command line tool.

use oxide_dml_core::DmlError;

/// Errors that can occur while parsing arguments or running a merge.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// A `--set` argument is not of the form `column=kind:value`.
    #[error("Invalid assignment '{0}': expected column=kind:value")]
    MalformedAssignment(String),

    /// A `--set` argument names an unknown value kind.
    #[error("Unknown value kind '{0}' (expected int, real, text, bool, url or null)")]
    UnknownKind(String),

    /// A `--set` value does not parse as its kind.
    #[error("Invalid {kind} value '{value}': {reason}")]
    InvalidValue {
        /// The declared kind.
        kind: &'static str,
        /// The raw value.
        value: String,
        /// Why parsing failed.
        reason: String,
    },

    /// A `--key` column has no matching `--set`.
    #[error("Key column '{0}' must also be assigned with --set")]
    UnassignedKey(String),

    /// Building or running the merge failed.
    #[error(transparent)]
    Dml(#[from] DmlError),
}

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
