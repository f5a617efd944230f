//! Fully inherited rank profiles.

use std::collections::HashSet;

use indexmap::IndexMap;
use rankdef_core::{
    ConstantDef, FunctionDef, InputDef, ModelDef, RankProfileDef, RankSettingDef, TuningDef,
};

use crate::expr::{self, Expr};
use crate::{Error, Result};

/// A user function with its parsed body.
#[derive(Clone, Debug, PartialEq)]
pub struct RankingFunction {
    pub def: FunctionDef,
    pub body: Expr,
}

impl RankingFunction {
    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn parameters(&self) -> impl Iterator<Item = &str> {
        self.def.arguments.iter().map(|a| a.name.as_str())
    }
}

/// A rank profile with inheritance flattened in.
///
/// Expressions are parsed, everything else is still the declared form.
/// Feature lists stay text: they are only parsed when they name a function.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompiledRankProfile {
    pub name: String,
    /// Direct parents, after the implicit `default` parent was added.
    pub inherits: Vec<String>,
    pub first_phase: Option<Expr>,
    pub second_phase: Option<Expr>,
    pub global_phase: Option<Expr>,
    pub functions: IndexMap<String, RankingFunction>,
    pub summary_features: Vec<String>,
    pub match_features: Vec<String>,
    pub hidden_match_features: Vec<String>,
    pub rank_features: Vec<String>,
    pub ignore_default_rank_features: bool,
    pub rank_settings: Vec<RankSettingDef>,
    pub constants: IndexMap<String, ConstantDef>,
    pub models: IndexMap<String, ModelDef>,
    pub inputs: IndexMap<String, InputDef>,
    pub tuning: TuningDef,
}

impl CompiledRankProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Layer `parent` under `self`: whatever `self` already has wins.
    pub fn inherit(&mut self, parent: &CompiledRankProfile) {
        self.first_phase = self.first_phase.take().or_else(|| parent.first_phase.clone());
        self.second_phase = self.second_phase.take().or_else(|| parent.second_phase.clone());
        self.global_phase = self.global_phase.take().or_else(|| parent.global_phase.clone());

        for (name, function) in &parent.functions {
            self.functions
                .entry(name.clone())
                .or_insert_with(|| function.clone());
        }
        append_unique(&mut self.summary_features, &parent.summary_features);
        append_unique(&mut self.match_features, &parent.match_features);
        append_unique(&mut self.hidden_match_features, &parent.hidden_match_features);
        append_unique(&mut self.rank_features, &parent.rank_features);
        self.ignore_default_rank_features |= parent.ignore_default_rank_features;
        self.rank_settings.extend(parent.rank_settings.iter().cloned());

        for (name, constant) in &parent.constants {
            self.constants
                .entry(name.clone())
                .or_insert_with(|| constant.clone());
        }
        for (name, model) in &parent.models {
            self.models.entry(name.clone()).or_insert_with(|| model.clone());
        }
        for (name, input) in &parent.inputs {
            self.inputs.entry(name.clone()).or_insert_with(|| input.clone());
        }
        self.tuning = parent.tuning.overlay(&self.tuning);
    }

    /// Overlay a declared profile on top of what was inherited so far.
    ///
    /// Feature lists keep parent entries first; declared rank settings come
    /// after the inherited ones.
    pub fn apply(&mut self, def: &RankProfileDef) -> Result<()> {
        let context = |what: &str| format!("{what} of rank profile '{}'", def.name);

        if let Some(text) = &def.first_phase {
            self.first_phase = Some(parse_in(text, || context("first-phase expression"))?);
        }
        if let Some(text) = &def.second_phase {
            self.second_phase = Some(parse_in(text, || context("second-phase expression"))?);
        }
        if let Some(text) = &def.global_phase {
            self.global_phase = Some(parse_in(text, || context("global-phase expression"))?);
        }

        for function in &def.functions {
            let body = parse_in(&function.body, || {
                context(&format!("function '{}'", function.name))
            })?;
            self.functions.insert(
                function.name.clone(),
                RankingFunction {
                    def: function.clone(),
                    body,
                },
            );
        }

        append_unique(&mut self.summary_features, &def.summary_features);
        append_unique(&mut self.match_features, &def.match_features);
        append_unique(&mut self.hidden_match_features, &def.hidden_match_features);
        append_unique(&mut self.rank_features, &def.rank_features);
        self.ignore_default_rank_features |= def.ignore_default_rank_features;
        self.rank_settings.extend(def.rank_settings.iter().cloned());

        for constant in &def.constants {
            self.constants.insert(constant.name.clone(), constant.clone());
        }
        for model in &def.models {
            self.models.insert(model.name.clone(), model.clone());
        }
        for input in &def.inputs {
            self.inputs.insert(input.name.clone(), input.clone());
        }
        self.tuning = self.tuning.overlay(&def.tuning);
        Ok(())
    }

    pub fn function(&self, name: &str) -> Option<&RankingFunction> {
        self.functions.get(name)
    }
}

fn parse_in(text: &str, context: impl FnOnce() -> String) -> Result<Expr> {
    expr::parse(text).map_err(|source| Error::ExpressionParse {
        context: context(),
        source,
    })
}

fn append_unique(target: &mut Vec<String>, items: &[String]) {
    let mut seen: HashSet<String> = target.iter().cloned().collect();
    for item in items {
        let item = item.trim();
        if seen.insert(item.to_string()) {
            target.push(item.to_string());
        }
    }
}
