//! Native rank types.

use serde::{Deserialize, Serialize};

/// Built-in term-match scoring preset for a field.
///
/// The vocabulary is closed: adding a variant forces every `match` over it
/// (most importantly the native table resolver) to handle the new arm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankType {
    #[default]
    Default,
    About,
    Identity,
    Tags,
    /// Known to the schema language but without a native table definition.
    Empty,
}

impl RankType {
    pub const ALL: [RankType; 5] = [
        RankType::Default,
        RankType::About,
        RankType::Identity,
        RankType::Tags,
        RankType::Empty,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RankType::Default => "default",
            RankType::About => "about",
            RankType::Identity => "identity",
            RankType::Tags => "tags",
            RankType::Empty => "empty",
        }
    }

    /// Case-insensitive lookup by schema name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for RankType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
