#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for the rankdef schema model.
//!
//! Two layers:
//! - **Deserialization layer**: 1:1 mapping to the JSON form of a schema model
//!   (`SchemaDef`, `RankProfileDef`, ...). Expressions are still text here.
//! - **Shared vocabulary**: value types, rank types, the attribute snapshot and
//!   deploy-time properties used by every later stage.

mod attributes;
mod deploy;
mod model;
mod rank_type;
mod value_type;

#[cfg(test)]
mod rank_type_tests;

pub use attributes::AttributeFields;
pub use deploy::DeployProperties;
pub use model::{
    ArgumentDef, ConstantDef, ConstantSource, DiversityDef, FunctionDef, InputDef, MatchPhaseDef,
    ModelDef, RankProfileDef, RankSetting, RankSettingDef, SchemaDef, TuningDef, UNSET,
};
pub use rank_type::RankType;
pub use value_type::ValueType;

/// Name of the profile every schema carries, declared or not.
pub const DEFAULT_PROFILE: &str = "default";

/// Parse the JSON form of a schema model.
pub fn parse_schema(json: &str) -> Result<SchemaDef, serde_json::Error> {
    serde_json::from_str(json)
}

/// Parse the JSON form of several schemas (a document-type hierarchy).
pub fn parse_schemas(json: &str) -> Result<Vec<SchemaDef>, serde_json::Error> {
    serde_json::from_str(json)
}
