//! Single-profile compiler.
//!
//! Turns one fully inherited profile into its ordered property list. The
//! section order is fixed so that compiling the same profile twice gives the
//! same bytes.

use indexmap::IndexMap;
use rankdef_core::{ConstantDef, ConstantSource, RankSetting, TuningDef, UNSET};
use rankdef_properties::{Property, RawRankProfile, codec, keys};
use tracing::debug;

use super::CompiledRankProfile;
use crate::expr::{self, Expr};
use crate::externalize::externalize;
use crate::native::{self, FieldRankSettings};
use crate::rewrite::{
    ExpandedFeatures, SerializationContext, SerializedFunction, expand_features, rewrite_models,
};
use crate::schedule::DeriveCtx;
use crate::{Error, Result};

/// Hard cap on the number of properties of one profile.
pub const MAX_PROPERTIES: usize = 1_000_000;

const PHASES: [(&str, &str); 3] = [
    (keys::FIRST_PHASE, "firstphase"),
    (keys::SECOND_PHASE, "secondphase"),
    (keys::GLOBAL_PHASE, "globalphase"),
];

/// Compile one profile into its raw, compressed form.
pub fn compile_profile(ctx: &DeriveCtx<'_>, profile: &CompiledRankProfile) -> Result<RawRankProfile> {
    let mut serializer = SerializationContext::new(profile, ctx.types());

    let features = expand_features(&mut serializer, profile)?;
    let phases = [&profile.first_phase, &profile.second_phase, &profile.global_phase];
    let mut rewritten_phases = Vec::new();
    for ((key, name), phase) in PHASES.into_iter().zip(phases) {
        if let Some(phase) = phase {
            rewritten_phases.push((key, name, serializer.rewrite(phase)?));
        }
    }
    let models = rewrite_models(&mut serializer, ctx.schema_models(), profile)?;
    for function in profile.functions.values().filter(|f| !f.def.inline) {
        serializer.serialize_function(function)?;
    }
    let functions = serializer.into_functions();

    let mut emitter = Emitter::new(ctx, profile);
    emitter.phases(rewritten_phases)?;
    emitter.functions(&functions)?;
    emitter.features(&features);
    emitter.fields()?;
    emitter.tuning(&profile.tuning);
    emitter.constants();
    emitter.types();
    emitter.deploy_flags();
    let properties = emitter.finish()?;

    let properties = externalize(
        &profile.name,
        properties,
        ctx.deploy.large_rank_expression_limit,
        ctx.files,
    );
    debug!(
        profile = %profile.name,
        properties = properties.len(),
        functions = functions.len(),
        "compiled rank profile"
    );
    Ok(RawRankProfile::new(
        profile.name.clone(),
        &properties,
        profile.constants.values().cloned().collect(),
        profile.models.values().cloned().collect(),
    )?
    .with_backend_models(models))
}

struct Emitter<'a> {
    ctx: &'a DeriveCtx<'a>,
    profile: &'a CompiledRankProfile,
    properties: Vec<Property>,
}

impl<'a> Emitter<'a> {
    fn new(ctx: &'a DeriveCtx<'a>, profile: &'a CompiledRankProfile) -> Self {
        Self {
            ctx,
            profile,
            properties: Vec::new(),
        }
    }

    fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.push(Property::new(key, value));
    }

    /// Check that a rewritten expression still parses before it is emitted.
    fn verified(&self, what: &str, script: String) -> Result<String> {
        match expr::parse(&script) {
            Ok(_) => Ok(script),
            Err(source) => Err(Error::ExpressionParse {
                context: format!("rewritten {what} of rank profile '{}'", self.profile.name),
                source,
            }),
        }
    }

    fn phases(&mut self, phases: Vec<(&'static str, &'static str, Expr)>) -> Result<()> {
        for (key, name, expr) in phases {
            if matches!(expr, Expr::Ref(_)) {
                self.push(key, expr.to_string());
                continue;
            }
            let script = self.verified(&format!("{name} expression"), expr.to_string())?;
            self.push(key, keys::expression_ref(name));
            self.push(keys::ranking_script(name), script);
        }
        Ok(())
    }

    fn functions(&mut self, functions: &IndexMap<String, SerializedFunction>) -> Result<()> {
        for function in functions.values() {
            let script =
                self.verified(&format!("function '{}'", function.name), function.script.clone())?;
            self.push(keys::ranking_script(&function.name), script);
            for (argument, value_type) in &function.arguments {
                self.push(
                    keys::argument_type(&function.name, argument),
                    value_type.to_string(),
                );
            }
            self.push(
                keys::function_type(&function.name),
                function.return_type.to_string(),
            );
        }
        Ok(())
    }

    fn features(&mut self, features: &ExpandedFeatures) {
        let lists = [
            (keys::SUMMARY_FEATURE, &features.summary),
            (keys::MATCH_FEATURE, &features.matched),
            (keys::HIDDEN_MATCH_FEATURE, &features.hidden_matched),
            (keys::DUMP_FEATURE, &features.rank),
        ];
        for (key, list) in lists {
            for feature in list {
                self.push(key, feature.as_str());
            }
        }
        if self.profile.ignore_default_rank_features {
            self.push(keys::DUMP_IGNORE_DEFAULT_FEATURES, "true");
        }
        for (declared, backend) in &features.renames {
            self.push(keys::FEATURE_RENAME, declared.as_str());
            self.push(keys::FEATURE_RENAME, backend.as_str());
        }
    }

    fn fields(&mut self) -> Result<()> {
        let mut fields: IndexMap<String, FieldRankSettings> = IndexMap::new();
        for setting in &self.profile.rank_settings {
            let field = fields.entry(setting.field.clone()).or_default();
            match setting.setting {
                RankSetting::Weight(weight) => field.weight = Some(weight),
                RankSetting::Filter(filter) => field.filter = filter,
                RankSetting::RankType(rank_type) => native::apply_rank_type(
                    field,
                    &setting.field,
                    rank_type,
                    self.ctx.attributes,
                )?,
            }
        }
        self.properties.extend(native::field_properties(&fields));
        Ok(())
    }

    fn tuning(&mut self, tuning: &TuningDef) {
        fn int(value: i32) -> Option<String> {
            (value != UNSET).then(|| value.to_string())
        }
        fn float(value: Option<f64>) -> Option<String> {
            value.map(|v| v.to_string())
        }

        self.knobs([
            (keys::TERMWISE_LIMIT, float(tuning.termwise_limit)),
            (keys::NUM_THREADS_PER_SEARCH, int(tuning.num_threads_per_search)),
            (keys::MIN_HITS_PER_THREAD, int(tuning.min_hits_per_thread)),
            (keys::NUM_SEARCH_PARTITIONS, int(tuning.num_search_partitions)),
            (keys::GLOBAL_FILTER_UPPER_LIMIT, float(tuning.post_filter_threshold)),
            (keys::GLOBAL_FILTER_LOWER_LIMIT, float(tuning.approximate_threshold)),
            (
                keys::TARGET_HITS_MAX_ADJUSTMENT_FACTOR,
                float(tuning.target_hits_max_adjustment_factor),
            ),
        ]);

        if let Some(match_phase) = &tuning.match_phase {
            self.push(keys::MATCH_PHASE_ATTRIBUTE, match_phase.attribute.as_str());
            self.push(keys::MATCH_PHASE_ASCENDING, match_phase.ascending.to_string());
            self.push(keys::MATCH_PHASE_MAX_HITS, match_phase.max_hits.to_string());
            self.push(
                keys::MATCH_PHASE_MAX_FILTER_COVERAGE,
                match_phase.max_filter_coverage.to_string(),
            );
        }
        if let Some(diversity) = &tuning.diversity {
            self.push(keys::DIVERSITY_ATTRIBUTE, diversity.attribute.as_str());
            self.push(keys::DIVERSITY_MIN_GROUPS, diversity.min_groups.to_string());
            self.push(keys::DIVERSITY_CUTOFF_FACTOR, diversity.cutoff_factor.to_string());
            self.push(keys::DIVERSITY_CUTOFF_STRATEGY, diversity.cutoff_strategy.as_str());
        }

        self.knobs([
            (keys::HEAP_SIZE, int(tuning.rerank_count)),
            (keys::ARRAY_SIZE, int(tuning.keep_rank_count)),
            (keys::RANK_SCORE_DROP_LIMIT, float(tuning.rank_score_drop_limit)),
            (
                keys::SECOND_PHASE_RANK_SCORE_DROP_LIMIT,
                float(tuning.second_phase_rank_score_drop_limit),
            ),
            (keys::GLOBAL_PHASE_RERANK_COUNT, int(tuning.global_phase_rerank_count)),
        ]);
    }

    /// Push the knobs that are set.
    fn knobs<const N: usize>(&mut self, knobs: [(&str, Option<String>); N]) {
        for (key, value) in knobs {
            if let Some(value) = value {
                self.push(key, value);
            }
        }
    }

    /// Inline-valued constants: schema-level first, profile-level overriding.
    fn constants(&mut self) {
        let mut constants: IndexMap<&str, &ConstantDef> = IndexMap::new();
        for constant in self.ctx.schema_constants() {
            constants.insert(&constant.name, constant);
        }
        for constant in self.profile.constants.values() {
            constants.insert(&constant.name, constant);
        }
        for constant in constants.values() {
            if let ConstantSource::Value(value) = &constant.source {
                self.push(keys::constant(&constant.name), value.as_str());
                self.push(keys::constant_type(&constant.name), constant.value_type.to_string());
            }
        }
    }

    fn types(&mut self) {
        for (field, value_type) in self.ctx.attributes.iter() {
            if !value_type.is_scalar() {
                self.push(keys::type_attribute(field), value_type.to_string());
            }
        }
        for input in self.profile.inputs.values() {
            if !input.value_type.is_scalar() {
                self.push(keys::type_query(&input.name), input.value_type.to_string());
            }
        }
        for input in self.profile.inputs.values() {
            if let Some(default) = &input.default {
                self.push(keys::query_default(&input.name), default.as_str());
            }
        }
    }

    fn deploy_flags(&mut self) {
        if self.ctx.deploy.sort_blueprints_by_cost {
            self.push(keys::SORT_BLUEPRINTS_BY_COST, "true");
        }
        if self.ctx.deploy.always_mark_phrase_expensive {
            self.push(keys::ALWAYS_MARK_PHRASE_EXPENSIVE, "true");
        }
    }

    fn finish(self) -> Result<Vec<Property>> {
        let count = self.properties.len();
        if count >= MAX_PROPERTIES {
            return Err(Error::PropertyOverflow {
                profile: self.profile.name.clone(),
                count,
                limit: MAX_PROPERTIES,
            });
        }
        let unencodable = self
            .properties
            .iter()
            .find(|p| codec::contains_separator(&p.key) || codec::contains_separator(&p.value));
        if let Some(property) = unencodable {
            return Err(Error::ReservedCharacter {
                profile: self.profile.name.clone(),
                key: property.key.clone(),
            });
        }
        Ok(self.properties)
    }
}
