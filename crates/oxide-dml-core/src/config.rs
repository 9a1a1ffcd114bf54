//! Per-connection configuration shared by clause builders.

use std::sync::Arc;

use crate::codec::CodecRegistry;
use crate::dialect::{Dialect, MergeStrategy};

/// The dialect and codec registry a statement is built against.
///
/// Cloning is cheap: both parts are reference counted and read-only.
#[derive(Debug, Clone)]
pub struct Configuration {
    dialect: Arc<dyn Dialect>,
    registry: Arc<CodecRegistry>,
}

impl Configuration {
    /// Creates a configuration with its own registry of the built-in codecs.
    ///
    /// Each call builds a fresh registry. To share one registry across
    /// dialects and connections, build it once and pass it to
    /// [`with_registry`](Self::with_registry).
    #[must_use]
    pub fn new(dialect: impl Dialect + 'static) -> Self {
        Self {
            dialect: Arc::new(dialect),
            registry: Arc::new(CodecRegistry::with_defaults()),
        }
    }

    /// Replaces the codec registry.
    ///
    /// ```rust
    /// use std::sync::Arc;
    ///
    /// use oxide_dml_core::dialect::{H2Dialect, PostgresDialect};
    /// use oxide_dml_core::{CodecRegistry, Configuration};
    ///
    /// let registry = Arc::new(CodecRegistry::with_defaults());
    /// let h2 = Configuration::new(H2Dialect::new()).with_registry(Arc::clone(&registry));
    /// let postgres = Configuration::new(PostgresDialect::new()).with_registry(registry);
    /// assert!(std::ptr::eq(h2.registry(), postgres.registry()));
    /// ```
    #[must_use]
    pub fn with_registry(mut self, registry: impl Into<Arc<CodecRegistry>>) -> Self {
        self.registry = registry.into();
        self
    }

    /// Returns the dialect.
    #[must_use]
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Returns the codec registry.
    #[must_use]
    pub fn registry(&self) -> &CodecRegistry {
        &self.registry
    }

    /// Returns how merges run under this configuration.
    #[must_use]
    pub fn merge_strategy(&self) -> MergeStrategy {
        MergeStrategy::resolve(self.dialect())
    }
}
