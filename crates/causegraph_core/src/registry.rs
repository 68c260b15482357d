//! Field extractor registry.
//!
//! The registry is a closed allow-list from exact runtime type name to a
//! function that turns an instance into ordered `(name, value)` fields.
//! Types that are not registered contribute no fields, whatever state
//! they carry; there is no supertype matching and no reflection.

use crate::error::{CoreError, CoreResult};
use crate::graph::Field;
use crate::native::{NativeException, TransactionError};
use indexmap::IndexMap;
use once_cell::sync::Lazy;

/// Produces the ordered fields of one registered exception type
pub type Extractor = fn(&dyn NativeException) -> Vec<Field>;

/// Field name emitted for [`TransactionError`]
pub const ERROR_CODE_FIELD: &str = "errorCode";

static GLOBAL: Lazy<ExtractorRegistry> = Lazy::new(ExtractorRegistry::with_defaults);

/// Registry of field extractors keyed by exact type name
#[derive(Clone)]
pub struct ExtractorRegistry {
    extractors: IndexMap<String, Extractor>,
}

impl ExtractorRegistry {
    /// Create a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            extractors: IndexMap::new(),
        }
    }

    /// Create a registry holding the built-in extractors
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .extractors
            .insert(TransactionError::TYPE_NAME.to_string(), transaction_error_fields);
        registry
    }

    /// Process-wide registry with the built-in extractors
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Register an extractor
    ///
    /// # Errors
    ///
    /// Returns error if the type already has an extractor
    pub fn register(&mut self, type_name: impl Into<String>, extractor: Extractor) -> CoreResult<()> {
        let type_name = type_name.into();
        if self.extractors.contains_key(&type_name) {
            return Err(CoreError::DuplicateExtractor { type_name });
        }
        self.extractors.insert(type_name, extractor);
        Ok(())
    }

    /// Look up the extractor for an exact type name
    #[must_use]
    pub fn lookup(&self, type_name: &str) -> Option<Extractor> {
        self.extractors.get(type_name).copied()
    }

    /// Extract fields for an exception, empty if its type is not registered
    #[must_use]
    pub fn extract(&self, exception: &dyn NativeException) -> Vec<Field> {
        self.lookup(exception.type_name())
            .map(|extractor| extractor(exception))
            .unwrap_or_default()
    }

    /// Registered type names in registration order
    #[must_use]
    pub fn type_names(&self) -> Vec<&str> {
        self.extractors.keys().map(String::as_str).collect()
    }

    /// Number of registered extractors
    #[must_use]
    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    /// Whether no extractor is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.extractors.keys()).finish()
    }
}

fn transaction_error_fields(exception: &dyn NativeException) -> Vec<Field> {
    exception
        .as_any()
        .downcast_ref::<TransactionError>()
        .map(|tx| vec![Field::new(ERROR_CODE_FIELD, tx.error_code().to_string())])
        .unwrap_or_default()
}
