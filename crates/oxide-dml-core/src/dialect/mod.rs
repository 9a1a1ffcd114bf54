//! SQL Dialect support.
//!
//! Different databases have slightly different SQL syntax. This module
//! provides a trait for dialect-specific behavior, most importantly whether
//! a backend can run a MERGE natively and which grammar it uses for it.

mod generic;
mod h2;
mod postgres;

pub use generic::GenericDialect;
pub use h2::H2Dialect;
pub use postgres::PostgresDialect;

use core::fmt;

/// Grammar used to render a native merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergeSyntax {
    /// `MERGE INTO t (cols) KEY (keys) VALUES (...)` (H2).
    KeyValues,
    /// `INSERT INTO t (cols) VALUES (...) ON CONFLICT (keys) DO UPDATE SET ...`
    /// (SQLite, PostgreSQL).
    OnConflict,
    /// SQL:2003 `MERGE INTO t USING ... ON ... WHEN MATCHED ... WHEN NOT MATCHED ...`.
    Standard,
}

impl MergeSyntax {
    /// Returns whether this grammar cannot express a merge without key columns.
    #[must_use]
    pub const fn requires_keys(self) -> bool {
        !matches!(self, Self::KeyValues)
    }
}

/// How a merge is carried out against a given dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Render a single merge statement.
    Native(MergeSyntax),
    /// Probe by key, then run an UPDATE or an INSERT.
    Composite,
}

impl MergeStrategy {
    /// Resolves the strategy from the dialect's capability flag.
    #[must_use]
    pub fn resolve(dialect: &dyn Dialect) -> Self {
        if dialect.supports_native_merge() {
            Self::Native(dialect.merge_syntax())
        } else {
            Self::Composite
        }
    }
}

/// Trait for SQL dialect-specific behavior.
pub trait Dialect: fmt::Debug + Send + Sync {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the identifier quote character (e.g., `"` for standard SQL, `` ` `` for MySQL).
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Returns the placeholder for the parameter at the 1-based `position`.
    fn placeholder(&self, position: usize) -> String {
        let _ = position;
        String::from("?")
    }

    /// Returns whether the backend runs merges natively.
    fn supports_native_merge(&self) -> bool {
        false
    }

    /// Returns the grammar used to render a merge.
    ///
    /// Also used for diagnostics when native merge is unsupported.
    fn merge_syntax(&self) -> MergeSyntax {
        MergeSyntax::Standard
    }

    /// Quotes an identifier, doubling any embedded quote characters.
    fn quote_identifier(&self, name: &str) -> String {
        let quote = self.identifier_quote();
        let mut escaped = String::with_capacity(name.len() + 2);
        escaped.push(quote);
        for c in name.chars() {
            if c == quote {
                escaped.push(quote);
            }
            escaped.push(c);
        }
        escaped.push(quote);
        escaped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier_escapes_quotes() {
        let dialect = GenericDialect::new();
        assert_eq!(dialect.quote_identifier("users"), "\"users\"");
        assert_eq!(dialect.quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_strategy_resolution() {
        assert_eq!(
            MergeStrategy::resolve(&GenericDialect::new()),
            MergeStrategy::Composite
        );
        assert_eq!(
            MergeStrategy::resolve(&H2Dialect::new()),
            MergeStrategy::Native(MergeSyntax::KeyValues)
        );
        assert_eq!(
            MergeStrategy::resolve(&PostgresDialect::new()),
            MergeStrategy::Native(MergeSyntax::OnConflict)
        );
    }

    #[test]
    fn test_requires_keys() {
        assert!(!MergeSyntax::KeyValues.requires_keys());
        assert!(MergeSyntax::OnConflict.requires_keys());
        assert!(MergeSyntax::Standard.requires_keys());
    }
}
