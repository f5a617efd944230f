//! Derived configuration facade.
//!
//! Runs the scheduler once and exposes the results as the records the
//! config export consumes.

use indexmap::IndexMap;
use rankdef_core::{ConstantSource, ModelDef, ValueType};
use rankdef_properties::Property;
use serde::Serialize;
use tracing::warn;

use crate::registry::{FileReference, FileRegistry};
use crate::schedule::{DeriveCtx, RankProfileList, compile_all};
use crate::{Error, Result};

/// Properties of one rank profile, decompressed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RankProfileConfig {
    pub name: String,
    pub properties: Vec<Property>,
}

/// A file-backed constant and the reference to fetch it by.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RankingConstantConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    pub file_ref: FileReference,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OnnxModelConfig {
    pub name: String,
    pub file_ref: FileReference,
    pub inputs: IndexMap<String, String>,
    pub outputs: IndexMap<String, String>,
}

/// Everything a derivation produces, in export form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DerivedExport {
    pub rank_profiles: Vec<RankProfileConfig>,
    pub ranking_constants: Vec<RankingConstantConfig>,
    pub onnx_models: Vec<OnnxModelConfig>,
}

#[derive(Debug)]
pub struct DerivedConfiguration {
    profiles: RankProfileList,
    constants: Vec<RankingConstantConfig>,
    models: Vec<OnnxModelConfig>,
}

impl DerivedConfiguration {
    /// Compile all rank profiles and resolve their distributed files.
    ///
    /// File constants are looked up under their path. A constant whose file
    /// was never registered fails the derivation; a model whose file is
    /// missing is left out.
    pub fn derive(ctx: &DeriveCtx<'_>) -> Result<Self> {
        let profiles = compile_all(ctx)?;
        let constants = constant_configs(&profiles, ctx.files)?;
        let models = model_configs(&profiles, ctx.files);
        Ok(Self {
            profiles,
            constants,
            models,
        })
    }

    pub fn rank_profiles(&self) -> &RankProfileList {
        &self.profiles
    }

    /// One record per profile. Blobs are decompressed on every call.
    pub fn rank_profile_configs(&self) -> Result<Vec<RankProfileConfig>> {
        self.profiles
            .iter()
            .map(|profile| {
                Ok(RankProfileConfig {
                    name: profile.name().to_string(),
                    properties: profile.properties()?,
                })
            })
            .collect()
    }

    pub fn ranking_constants_config(&self) -> &[RankingConstantConfig] {
        &self.constants
    }

    pub fn onnx_models_config(&self) -> &[OnnxModelConfig] {
        &self.models
    }

    pub fn export(&self) -> Result<DerivedExport> {
        Ok(DerivedExport {
            rank_profiles: self.rank_profile_configs()?,
            ranking_constants: self.constants.clone(),
            onnx_models: self.models.clone(),
        })
    }
}

fn constant_configs(
    profiles: &RankProfileList,
    files: &dyn FileRegistry,
) -> Result<Vec<RankingConstantConfig>> {
    let mut configs = Vec::new();
    for constant in profiles.constants().values() {
        let ConstantSource::File(path) = &constant.source else {
            continue;
        };
        let file_ref = files.lookup(path).ok_or_else(|| Error::MissingFile {
            kind: "constant",
            name: constant.name.clone(),
            path: path.clone(),
        })?;
        configs.push(RankingConstantConfig {
            name: constant.name.clone(),
            value_type: constant.value_type.clone(),
            file_ref,
        });
    }
    Ok(configs)
}

fn model_configs(profiles: &RankProfileList, files: &dyn FileRegistry) -> Vec<OnnxModelConfig> {
    profiles
        .models()
        .values()
        .filter_map(|model| {
            let Some(file_ref) = files.lookup(&model.path) else {
                warn!(model = %model.name, path = %model.path, "model file not registered, skipping");
                return None;
            };
            Some(OnnxModelConfig {
                name: model.name.clone(),
                file_ref,
                inputs: backend_inputs(profiles, model),
                outputs: model.outputs.clone(),
            })
        })
        .collect()
}

/// Declared inputs, each in the backend form a profile rewrote it to.
fn backend_inputs(profiles: &RankProfileList, model: &ModelDef) -> IndexMap<String, String> {
    let rewritten: Vec<&ModelDef> = profiles
        .iter()
        .flat_map(|profile| profile.backend_models())
        .filter(|m| m.name == model.name)
        .collect();
    model
        .inputs
        .iter()
        .map(|(input, source)| {
            let backend = rewritten
                .iter()
                .filter_map(|m| m.inputs.get(input))
                .find(|value| *value != source)
                .unwrap_or(source);
            (input.clone(), backend.clone())
        })
        .collect()
}
