//! H2 dialect.

use super::{Dialect, MergeSyntax};

/// H2 dialect: native `MERGE INTO ... KEY (...)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct H2Dialect;

impl H2Dialect {
    /// Creates a new H2 dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for H2Dialect {
    fn name(&self) -> &'static str {
        "h2"
    }

    fn supports_native_merge(&self) -> bool {
        true
    }

    fn merge_syntax(&self) -> MergeSyntax {
        MergeSyntax::KeyValues
    }
}
