//! Declared feature lists and model inputs.

use indexmap::IndexMap;
use rankdef_core::ModelDef;

use super::SerializationContext;
use crate::expr::{self, Expr};
use crate::profile::CompiledRankProfile;
use crate::{Error, Result};

/// Feature lists as the backend sees them, plus the renames that map
/// backend names back to what the schema declared.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpandedFeatures {
    pub summary: Vec<String>,
    pub matched: Vec<String>,
    pub hidden_matched: Vec<String>,
    pub rank: Vec<String>,
    /// Declared text to backend text, first occurrence order.
    pub renames: IndexMap<String, String>,
}

/// Rewrite every declared feature that is a user function (or a feature the
/// backend names differently) and record its rename.
///
/// Builds new lists; the profile's lists are never touched.
pub fn expand_features(
    ctx: &mut SerializationContext<'_>,
    profile: &CompiledRankProfile,
) -> Result<ExpandedFeatures> {
    let mut renames = IndexMap::new();
    let mut expand = |list: &[String]| -> Result<Vec<String>> {
        list.iter()
            .map(|feature| expand_feature(ctx, profile, feature, &mut renames))
            .collect()
    };
    let summary = expand(&profile.summary_features)?;
    let matched = expand(&profile.match_features)?;
    let hidden_matched = expand(&profile.hidden_match_features)?;
    let rank = expand(&profile.rank_features)?;
    Ok(ExpandedFeatures {
        summary,
        matched,
        hidden_matched,
        rank,
        renames,
    })
}

fn expand_feature(
    ctx: &mut SerializationContext<'_>,
    profile: &CompiledRankProfile,
    feature: &str,
    renames: &mut IndexMap<String, String>,
) -> Result<String> {
    // Most features are plain rank features; only parse the ones whose head
    // names something that gets rewritten.
    let head = feature_head(feature);
    if profile.function(head).is_none() && head == super::backend_feature_name(head) {
        return Ok(feature.to_string());
    }

    let parsed = expr::parse(feature).map_err(|source| Error::ExpressionParse {
        context: format!("feature '{feature}' of rank profile '{}'", profile.name),
        source,
    })?;
    let Expr::Ref(reference) = &parsed else {
        return Ok(feature.to_string());
    };

    let backend = ctx.feature_reference(reference)?.to_string();
    let declared = parsed.to_string();
    if backend != declared {
        renames.entry(declared).or_insert_with(|| backend.clone());
    }
    Ok(backend)
}

/// Leading identifier of a feature: `fieldMatch` in `fieldMatch(title).x`.
fn feature_head(feature: &str) -> &str {
    let feature = feature.trim_start();
    let end = feature
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '@' | '$')))
        .unwrap_or(feature.len());
    &feature[..end]
}

/// Point model inputs that name a user function at the serialized function.
///
/// Covers every model the profile can use: schema-level models, overridden
/// by the profile's own of the same name. Such functions are serialized even
/// when no phase expression uses them.
pub fn rewrite_models(
    ctx: &mut SerializationContext<'_>,
    schema_models: &[ModelDef],
    profile: &CompiledRankProfile,
) -> Result<Vec<ModelDef>> {
    let mut models: IndexMap<&str, &ModelDef> = IndexMap::new();
    for model in schema_models.iter().chain(profile.models.values()) {
        models.insert(&model.name, model);
    }
    models
        .into_values()
        .map(|model| rewrite_model(ctx, profile, model))
        .collect()
}

fn rewrite_model(
    ctx: &mut SerializationContext<'_>,
    profile: &CompiledRankProfile,
    model: &ModelDef,
) -> Result<ModelDef> {
    let mut rewritten = model.clone();
    for (input, source) in &model.inputs {
        let parsed = expr::parse(source).map_err(|source| Error::ExpressionParse {
            context: format!("input '{input}' of model '{}'", model.name),
            source,
        })?;
        let Expr::Ref(reference) = &parsed else {
            continue;
        };
        if reference.args.is_empty()
            && reference.output.is_none()
            && profile.function(&reference.name).is_some()
        {
            let backend = ctx.feature_reference(reference)?;
            rewritten.inputs.insert(input.clone(), backend.to_string());
        }
    }
    Ok(rewritten)
}
