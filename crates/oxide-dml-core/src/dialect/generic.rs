//! Generic SQL dialect.

use super::{Dialect, MergeSyntax};

/// A generic SQL dialect using ANSI SQL standards.
///
/// Merges are emulated; `Display` output uses the SQL:2003 MERGE form.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericDialect;

impl GenericDialect {
    /// Creates a new generic dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for GenericDialect {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn merge_syntax(&self) -> MergeSyntax {
        MergeSyntax::Standard
    }
}
