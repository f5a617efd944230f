use serde::{Deserialize, Serialize};

/// One `(key, value)` pair. Keys may repeat; order is significant.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Property {
    pub key: String,
    pub value: String,
}

impl Property {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl std::fmt::Display for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.key, self.value)
    }
}

/// Render properties one per line as `key = value`.
pub fn render(properties: &[Property]) -> String {
    properties
        .iter()
        .map(Property::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
