//! Value types of rank features and query inputs.

use serde::{Deserialize, Serialize};

/// Type of a ranking value, kept in its canonical text form.
///
/// `double` is the scalar type; tensor types keep their dimension list
/// (`tensor(x[3],y{})`). Whitespace is stripped on construction so that two
/// spellings of the same type compare equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ValueType(String);

impl ValueType {
    pub fn new(text: impl AsRef<str>) -> Self {
        Self(text.as_ref().chars().filter(|c| !c.is_whitespace()).collect())
    }

    pub fn double() -> Self {
        Self("double".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of tensor dimensions. `double` and `tensor()` are rank 0.
    pub fn rank(&self) -> usize {
        let Some(rest) = self.0.strip_prefix("tensor") else {
            return 0;
        };
        let (Some(open), Some(close)) = (rest.find('('), rest.rfind(')')) else {
            return 0;
        };
        if close <= open {
            return 0;
        }
        rest[open + 1..close]
            .split(',')
            .filter(|d| !d.is_empty())
            .count()
    }

    pub fn is_scalar(&self) -> bool {
        self.rank() == 0
    }

    pub fn is_double(&self) -> bool {
        self.0 == "double"
    }
}

impl Default for ValueType {
    fn default() -> Self {
        Self::double()
    }
}

impl From<String> for ValueType {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ValueType {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<ValueType> for String {
    fn from(t: ValueType) -> Self {
        t.0
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
