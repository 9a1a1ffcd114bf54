//! SQLite dialect implementation.

use oxide_dml_core::dialect::{Dialect, MergeSyntax};

/// SQLite dialect.
///
/// Merges run natively as `INSERT ... ON CONFLICT (keys) DO UPDATE` (SQLite
/// 3.24.0+). The conflict target must match a PRIMARY KEY or UNIQUE
/// constraint; for tables without one, switch to the composite merge with
/// [`with_native_merge(false)`](Self::with_native_merge).
#[derive(Debug, Clone, Copy)]
pub struct SqliteDialect {
    native_merge: bool,
}

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self { native_merge: true }
    }

    /// Chooses between the native upsert and the probe-based merge.
    #[must_use]
    pub const fn with_native_merge(mut self, native_merge: bool) -> Self {
        self.native_merge = native_merge;
        self
    }
}

impl Default for SqliteDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn identifier_quote(&self) -> char {
        '"' // SQLite also accepts backticks, but double quotes are standard
    }

    fn supports_native_merge(&self) -> bool {
        self.native_merge
    }

    fn merge_syntax(&self) -> MergeSyntax {
        MergeSyntax::OnConflict
    }
}
