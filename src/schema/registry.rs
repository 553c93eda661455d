//! Field value type registry
//!
//! Maps field names to the capability objects that know how to query them.
//! The registry is handed to the criteria builder at construction, never
//! looked up through ambient state.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::field_type::FieldValueType;

/// Field name to value type mapping
///
/// Backed by an ordered map so operations that expand to "all known fields"
/// (managed queries with no explicit field list) visit fields in a
/// deterministic order.
#[derive(Clone, Debug, Default)]
pub struct FieldRegistry {
    types: BTreeMap<String, Arc<dyn FieldValueType>>,
}

impl FieldRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry builder
    pub fn builder() -> FieldRegistryBuilder {
        FieldRegistryBuilder::default()
    }

    /// Resolve a field to its value type
    ///
    /// `None` means the field is unknown and has no capability for any
    /// operation.
    pub fn resolve(&self, field: &str) -> Option<Arc<dyn FieldValueType>> {
        self.types.get(field).cloned()
    }

    /// Check if a field is registered
    pub fn contains(&self, field: &str) -> bool {
        self.types.contains_key(field)
    }

    /// All registered field names, in name order
    pub fn field_names(&self) -> Vec<String> {
        self.types.keys().cloned().collect()
    }

    /// Number of registered fields
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Register a field value type, replacing any previous registration
    pub fn insert(&mut self, field: impl Into<String>, value_type: Arc<dyn FieldValueType>) {
        self.types.insert(field.into(), value_type);
    }
}

/// Builder for [`FieldRegistry`]
#[derive(Default)]
pub struct FieldRegistryBuilder {
    types: BTreeMap<String, Arc<dyn FieldValueType>>,
}

impl FieldRegistryBuilder {
    /// Register a field with its value type
    pub fn field(
        mut self,
        name: impl Into<String>,
        value_type: impl FieldValueType + 'static,
    ) -> Self {
        self.types.insert(name.into(), Arc::new(value_type));
        self
    }

    /// Register a field with a shared value type
    pub fn field_arc(mut self, name: impl Into<String>, value_type: Arc<dyn FieldValueType>) -> Self {
        self.types.insert(name.into(), value_type);
        self
    }

    /// Build the registry
    pub fn build(self) -> FieldRegistry {
        FieldRegistry { types: self.types }
    }
}
