//! PostgreSQL dialect.

use super::{Dialect, MergeSyntax};

/// PostgreSQL dialect: `$n` placeholders and `ON CONFLICT` upserts.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn placeholder(&self, position: usize) -> String {
        format!("${position}")
    }

    fn supports_native_merge(&self) -> bool {
        true
    }

    fn merge_syntax(&self) -> MergeSyntax {
        MergeSyntax::OnConflict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_placeholders() {
        let dialect = PostgresDialect::new();
        assert_eq!(dialect.placeholder(1), "$1");
        assert_eq!(dialect.placeholder(12), "$12");
    }
}
