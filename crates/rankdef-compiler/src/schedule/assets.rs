//! Aggregation of shared constants and models.

use indexmap::IndexMap;
use rankdef_core::{ConstantDef, ModelDef, SchemaDef};
use rankdef_properties::RawRankProfile;

use crate::{Error, Result};

/// Name-keyed assets where every definition of a name must be equal.
struct Assets<T> {
    kind: &'static str,
    entries: IndexMap<String, (T, String)>,
}

impl<T: Clone + PartialEq> Assets<T> {
    fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: IndexMap::new(),
        }
    }

    fn add(&mut self, name: &str, value: &T, origin: impl FnOnce() -> String) -> Result<()> {
        match self.entries.get(name) {
            None => {
                self.entries
                    .insert(name.to_string(), (value.clone(), origin()));
                Ok(())
            }
            Some((existing, _)) if existing == value => Ok(()),
            Some((_, first)) => Err(Error::ConfigurationConflict {
                kind: self.kind,
                name: name.to_string(),
                first: first.clone(),
                second: origin(),
            }),
        }
    }

    fn into_map(self) -> IndexMap<String, T> {
        self.entries.into_iter().map(|(k, (v, _))| (k, v)).collect()
    }
}

/// Collect constants, then models: schema-level first, then per profile in
/// completion order. Divergent definitions of one name are fatal.
pub(crate) fn aggregate(
    schema: Option<&SchemaDef>,
    profiles: &IndexMap<String, RawRankProfile>,
) -> Result<(IndexMap<String, ConstantDef>, IndexMap<String, ModelDef>)> {
    let schema_origin = || match schema {
        Some(s) => format!("schema '{}'", s.name),
        None => "schema".to_string(),
    };
    let profile_origin = |name: &str| format!("rank profile '{name}'");

    let mut constants = Assets::new("constant");
    for constant in schema.map_or(&[][..], |s| s.constants.as_slice()) {
        constants.add(&constant.name, constant, schema_origin)?;
    }
    for (name, profile) in profiles {
        for constant in profile.constants() {
            constants.add(&constant.name, constant, || profile_origin(name))?;
        }
    }

    let mut models = Assets::new("model");
    for model in schema.map_or(&[][..], |s| s.models.as_slice()) {
        models.add(&model.name, model, schema_origin)?;
    }
    for (name, profile) in profiles {
        for model in profile.models() {
            models.add(&model.name, model, || profile_origin(name))?;
        }
    }

    Ok((constants.into_map(), models.into_map()))
}
