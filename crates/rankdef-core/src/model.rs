//! Deserialization layer for schemas and rank profiles.
//!
//! Mirrors the already-validated schema model handed over by the schema
//! front end. Nothing here is resolved: inheritance is still a list of names
//! and every expression is still text.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{RankType, ValueType};

/// Sentinel for integer tuning knobs that were never set.
pub const UNSET: i32 = -1;

/// One document type with its shared assets and rank profiles.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaDef {
    pub name: String,
    /// Parent document types, nearest first.
    pub inherits: Vec<String>,
    pub constants: Vec<ConstantDef>,
    pub models: Vec<ModelDef>,
    pub profiles: Vec<RankProfileDef>,
}

impl SchemaDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn profile(&self, name: &str) -> Option<&RankProfileDef> {
        self.profiles.iter().find(|p| p.name == name)
    }
}

/// A rank profile as declared in the schema.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankProfileDef {
    pub name: String,
    pub inherits: Vec<String>,
    pub first_phase: Option<String>,
    pub second_phase: Option<String>,
    pub global_phase: Option<String>,
    pub functions: Vec<FunctionDef>,
    pub summary_features: Vec<String>,
    pub match_features: Vec<String>,
    pub hidden_match_features: Vec<String>,
    pub rank_features: Vec<String>,
    pub ignore_default_rank_features: bool,
    pub rank_settings: Vec<RankSettingDef>,
    pub constants: Vec<ConstantDef>,
    pub models: Vec<ModelDef>,
    pub inputs: Vec<InputDef>,
    pub tuning: TuningDef,
}

impl RankProfileDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// A user-defined ranking function (a "macro" in older schema syntax).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionDef {
    pub name: String,
    pub arguments: Vec<ArgumentDef>,
    pub return_type: Option<ValueType>,
    pub body: String,
    /// Inline functions are expanded at every call site instead of being
    /// serialized under their own name.
    pub inline: bool,
}

impl FunctionDef {
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentDef {
    pub name: String,
    #[serde(default, rename = "type")]
    pub value_type: Option<ValueType>,
}

/// Per-field rank setting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankSettingDef {
    pub field: String,
    #[serde(flatten)]
    pub setting: RankSetting,
}

impl RankSettingDef {
    pub fn new(field: impl Into<String>, setting: RankSetting) -> Self {
        Self {
            field: field.into(),
            setting,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankSetting {
    Weight(u32),
    RankType(RankType),
    Filter(bool),
}

/// A named constant shared between the schema and its profiles.
///
/// Two constants with the same name must be equal in every field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantDef {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    #[serde(flatten)]
    pub source: ConstantSource,
}

impl ConstantDef {
    pub fn value(name: impl Into<String>, value_type: ValueType, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_type,
            source: ConstantSource::Value(value.into()),
        }
    }

    pub fn file(name: impl Into<String>, value_type: ValueType, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_type,
            source: ConstantSource::File(path.into()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstantSource {
    /// Inline value, emitted directly into the profile properties.
    Value(String),
    /// Distributed as a file; the backend fetches it by reference.
    File(String),
}

/// An external machine-learned model referenced by a profile.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelDef {
    pub name: String,
    pub path: String,
    /// Model input name to source expression.
    pub inputs: IndexMap<String, String>,
    /// Model output name to exposed alias.
    pub outputs: IndexMap<String, String>,
}

impl ModelDef {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_input(mut self, input: impl Into<String>, source: impl Into<String>) -> Self {
        self.inputs.insert(input.into(), source.into());
        self
    }
}

/// A declared query input (`query(name)`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDef {
    pub name: String,
    #[serde(rename = "type", default)]
    pub value_type: ValueType,
    #[serde(default)]
    pub default: Option<String>,
}

/// Tuning knobs. Integer knobs use [`UNSET`], everything else uses `None`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningDef {
    pub rerank_count: i32,
    pub keep_rank_count: i32,
    pub global_phase_rerank_count: i32,
    pub rank_score_drop_limit: Option<f64>,
    pub second_phase_rank_score_drop_limit: Option<f64>,
    pub termwise_limit: Option<f64>,
    pub num_threads_per_search: i32,
    pub min_hits_per_thread: i32,
    pub num_search_partitions: i32,
    pub post_filter_threshold: Option<f64>,
    pub approximate_threshold: Option<f64>,
    pub target_hits_max_adjustment_factor: Option<f64>,
    pub match_phase: Option<MatchPhaseDef>,
    pub diversity: Option<DiversityDef>,
}

impl Default for TuningDef {
    fn default() -> Self {
        Self {
            rerank_count: UNSET,
            keep_rank_count: UNSET,
            global_phase_rerank_count: UNSET,
            rank_score_drop_limit: None,
            second_phase_rank_score_drop_limit: None,
            termwise_limit: None,
            num_threads_per_search: UNSET,
            min_hits_per_thread: UNSET,
            num_search_partitions: UNSET,
            post_filter_threshold: None,
            approximate_threshold: None,
            target_hits_max_adjustment_factor: None,
            match_phase: None,
            diversity: None,
        }
    }
}

impl TuningDef {
    /// Overlay `child` on `self`: every knob the child sets wins.
    pub fn overlay(&self, child: &TuningDef) -> TuningDef {
        fn int(parent: i32, child: i32) -> i32 {
            if child != UNSET { child } else { parent }
        }
        fn opt<T: Clone>(parent: &Option<T>, child: &Option<T>) -> Option<T> {
            child.clone().or_else(|| parent.clone())
        }

        TuningDef {
            rerank_count: int(self.rerank_count, child.rerank_count),
            keep_rank_count: int(self.keep_rank_count, child.keep_rank_count),
            global_phase_rerank_count: int(
                self.global_phase_rerank_count,
                child.global_phase_rerank_count,
            ),
            rank_score_drop_limit: opt(&self.rank_score_drop_limit, &child.rank_score_drop_limit),
            second_phase_rank_score_drop_limit: opt(
                &self.second_phase_rank_score_drop_limit,
                &child.second_phase_rank_score_drop_limit,
            ),
            termwise_limit: opt(&self.termwise_limit, &child.termwise_limit),
            num_threads_per_search: int(self.num_threads_per_search, child.num_threads_per_search),
            min_hits_per_thread: int(self.min_hits_per_thread, child.min_hits_per_thread),
            num_search_partitions: int(self.num_search_partitions, child.num_search_partitions),
            post_filter_threshold: opt(&self.post_filter_threshold, &child.post_filter_threshold),
            approximate_threshold: opt(&self.approximate_threshold, &child.approximate_threshold),
            target_hits_max_adjustment_factor: opt(
                &self.target_hits_max_adjustment_factor,
                &child.target_hits_max_adjustment_factor,
            ),
            match_phase: opt(&self.match_phase, &child.match_phase),
            diversity: opt(&self.diversity, &child.diversity),
        }
    }
}

/// Match-phase degradation settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchPhaseDef {
    pub attribute: String,
    #[serde(default)]
    pub ascending: bool,
    pub max_hits: u64,
    #[serde(default = "default_max_filter_coverage")]
    pub max_filter_coverage: f64,
}

fn default_max_filter_coverage() -> f64 {
    0.2
}

/// Result diversity settings applied during match-phase degradation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiversityDef {
    pub attribute: String,
    pub min_groups: u64,
    #[serde(default = "default_cutoff_factor")]
    pub cutoff_factor: f64,
    #[serde(default = "default_cutoff_strategy")]
    pub cutoff_strategy: String,
}

fn default_cutoff_factor() -> f64 {
    10.0
}

fn default_cutoff_strategy() -> String {
    "loose".to_string()
}
