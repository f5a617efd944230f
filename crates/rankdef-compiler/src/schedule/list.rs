use indexmap::IndexMap;
use rankdef_core::{ConstantDef, ModelDef};
use rankdef_properties::RawRankProfile;

/// All compiled profiles of one schema, with their shared assets.
///
/// Iteration follows submission order: `default` first, then wavefront by
/// wavefront in the order profiles were declared.
#[derive(Debug, Default)]
pub struct RankProfileList {
    profiles: IndexMap<String, RawRankProfile>,
    wavefronts: Vec<Vec<String>>,
    constants: IndexMap<String, ConstantDef>,
    models: IndexMap<String, ModelDef>,
}

impl RankProfileList {
    pub fn get(&self, name: &str) -> Option<&RawRankProfile> {
        self.profiles.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RawRankProfile> {
        self.profiles.values()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Members of each wavefront. When a schema exists, wavefront 0 is
    /// `default` alone.
    pub fn wavefronts(&self) -> &[Vec<String>] {
        &self.wavefronts
    }

    pub fn wavefront_of(&self, name: &str) -> Option<usize> {
        self.wavefronts
            .iter()
            .position(|members| members.iter().any(|m| m == name))
    }

    /// Constants of the schema and all profiles, deduplicated by name.
    pub fn constants(&self) -> &IndexMap<String, ConstantDef> {
        &self.constants
    }

    /// Models of the schema and all profiles, deduplicated by name.
    pub fn models(&self) -> &IndexMap<String, ModelDef> {
        &self.models
    }

    pub(crate) fn profiles(&self) -> &IndexMap<String, RawRankProfile> {
        &self.profiles
    }

    pub(crate) fn push_wavefront(&mut self, compiled: Vec<RawRankProfile>) {
        let members = compiled.iter().map(|p| p.name().to_string()).collect();
        for profile in compiled {
            self.profiles.insert(profile.name().to_string(), profile);
        }
        self.wavefronts.push(members);
    }

    pub(crate) fn set_assets(
        &mut self,
        constants: IndexMap<String, ConstantDef>,
        models: IndexMap<String, ModelDef>,
    ) {
        self.constants = constants;
        self.models = models;
    }
}
