use indexmap::IndexMap;
use rankdef_core::ValueType;
use serde::{Deserialize, Serialize};

/// Query-profile type declarations, consulted when typing `query(x)`.
pub trait QueryProfileRegistry: Send + Sync {
    /// Declared type of query input `name`, if any query profile declares it.
    fn feature_type(&self, name: &str) -> Option<ValueType>;
}

/// Map-backed [`QueryProfileRegistry`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryProfileTypes {
    types: IndexMap<String, ValueType>,
}

impl QueryProfileTypes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value_type: impl Into<ValueType>) -> Self {
        self.types.insert(name.into(), value_type.into());
        self
    }
}

impl QueryProfileRegistry for QueryProfileTypes {
    fn feature_type(&self, name: &str) -> Option<ValueType> {
        self.types.get(name).cloned()
    }
}
