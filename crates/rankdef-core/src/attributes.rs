//! Attribute-field snapshot.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ValueType;

/// Read-only view of which fields are attributes, and their types.
///
/// A field absent from the snapshot is an index field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeFields {
    fields: IndexMap<String, ValueType>,
}

impl AttributeFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value_type: impl Into<ValueType>) -> Self {
        self.insert(name, value_type);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value_type: impl Into<ValueType>) {
        self.fields.insert(name.into(), value_type.into());
    }

    pub fn is_attribute(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn attribute_type(&self, field: &str) -> Option<&ValueType> {
        self.fields.get(field)
    }

    /// Attributes in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValueType)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
