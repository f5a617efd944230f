//! Rank profile lookup and inheritance flattening.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use rankdef_core::{DEFAULT_PROFILE, RankProfileDef, SchemaDef};

use crate::profile::CompiledRankProfile;
use crate::{Error, Result};

/// Source of fully inherited rank profiles, keyed by (schema, profile).
///
/// Wavefront tasks resolve concurrently, so implementations must be safe to
/// share across threads.
pub trait ProfileRegistry: Send + Sync {
    /// Profiles of `schema`, `default` first, then declaration order.
    fn profile_names(&self, schema: &str) -> Vec<String>;

    /// Direct parents of a profile, including the implicit `default`.
    fn parents(&self, schema: &str, name: &str) -> Vec<String>;

    fn resolve(&self, schema: &str, name: &str) -> Result<Arc<CompiledRankProfile>>;

    /// Whether `name` is declared by a document type `schema` inherits from.
    /// Such profiles need not be compiled before their children.
    fn resolvable_in_ancestor(&self, schema: &str, name: &str) -> bool;
}

type Key = (String, String);

/// [`ProfileRegistry`] over in-memory schema definitions.
///
/// Every schema carries a `default` profile, declared or not. A profile
/// without explicit parents inherits `default`.
#[derive(Debug, Default)]
pub struct InMemoryProfileRegistry {
    schemas: IndexMap<String, SchemaDef>,
    resolved: RwLock<HashMap<Key, Arc<CompiledRankProfile>>>,
}

impl InMemoryProfileRegistry {
    pub fn new(schemas: impl IntoIterator<Item = SchemaDef>) -> Self {
        Self {
            schemas: schemas.into_iter().map(|s| (s.name.clone(), s)).collect(),
            resolved: RwLock::new(HashMap::new()),
        }
    }

    pub fn schema(&self, name: &str) -> Option<&SchemaDef> {
        self.schemas.get(name)
    }

    pub fn schemas(&self) -> impl Iterator<Item = &SchemaDef> {
        self.schemas.values()
    }

    /// Document types `schema` inherits from, nearest first, without `schema`.
    fn ancestors(&self, schema: &str) -> Vec<&SchemaDef> {
        let mut seen = HashSet::from([schema]);
        let mut queue: VecDeque<&str> = VecDeque::from([schema]);
        let mut ancestors = Vec::new();
        while let Some(current) = queue.pop_front() {
            let Some(def) = self.schemas.get(current) else {
                continue;
            };
            for parent in &def.inherits {
                if !seen.insert(parent.as_str()) {
                    continue;
                }
                if let Some(parent_def) = self.schemas.get(parent.as_str()) {
                    ancestors.push(parent_def);
                    queue.push_back(parent.as_str());
                }
            }
        }
        ancestors
    }

    /// The declaration `name` resolves to, and the schema that owns it.
    fn lookup(&self, schema: &str, name: &str) -> Option<(String, Cow<'_, RankProfileDef>)> {
        if let Some(def) = self.schemas.get(schema)?.profile(name) {
            return Some((schema.to_string(), Cow::Borrowed(def)));
        }
        for ancestor in self.ancestors(schema) {
            if let Some(def) = ancestor.profile(name) {
                return Some((ancestor.name.clone(), Cow::Borrowed(def)));
            }
        }
        (name == DEFAULT_PROFILE)
            .then(|| (schema.to_string(), Cow::Owned(RankProfileDef::new(DEFAULT_PROFILE))))
    }

    fn resolve_in(
        &self,
        schema: &str,
        name: &str,
        chain: &mut Vec<Key>,
    ) -> Result<Arc<CompiledRankProfile>> {
        let key = (schema.to_string(), name.to_string());
        if let Some(profile) = self.resolved.read().get(&key) {
            return Ok(Arc::clone(profile));
        }
        if let Some(start) = chain.iter().position(|k| *k == key) {
            let mut cycle: Vec<String> = chain[start..].iter().map(|(_, n)| n.clone()).collect();
            cycle.push(name.to_string());
            return Err(Error::InheritanceCycle { cycle });
        }

        let (owner, def) = self.lookup(schema, name).ok_or_else(|| Error::UnknownProfile {
            schema: schema.to_string(),
            name: name.to_string(),
        })?;

        let mut profile = CompiledRankProfile::new(name);
        profile.inherits = declared_parents(&def);
        chain.push(key.clone());
        for parent in &profile.inherits.clone() {
            let parent = self.resolve_in(&owner, parent, chain)?;
            profile.inherit(&parent);
        }
        chain.pop();
        profile.apply(&def)?;

        let profile = Arc::new(profile);
        Ok(Arc::clone(self.resolved.write().entry(key).or_insert(profile)))
    }
}

fn declared_parents(def: &RankProfileDef) -> Vec<String> {
    if def.inherits.is_empty() && def.name != DEFAULT_PROFILE {
        vec![DEFAULT_PROFILE.to_string()]
    } else {
        def.inherits.clone()
    }
}

impl ProfileRegistry for InMemoryProfileRegistry {
    fn profile_names(&self, schema: &str) -> Vec<String> {
        let Some(def) = self.schemas.get(schema) else {
            return Vec::new();
        };
        std::iter::once(DEFAULT_PROFILE.to_string())
            .chain(
                def.profiles
                    .iter()
                    .filter(|p| p.name != DEFAULT_PROFILE)
                    .map(|p| p.name.clone()),
            )
            .collect()
    }

    fn parents(&self, schema: &str, name: &str) -> Vec<String> {
        self.lookup(schema, name)
            .map(|(_, def)| declared_parents(&def))
            .unwrap_or_default()
    }

    fn resolve(&self, schema: &str, name: &str) -> Result<Arc<CompiledRankProfile>> {
        self.resolve_in(schema, name, &mut Vec::new())
    }

    fn resolvable_in_ancestor(&self, schema: &str, name: &str) -> bool {
        let ancestors = self.ancestors(schema);
        if name == DEFAULT_PROFILE {
            return !ancestors.is_empty();
        }
        ancestors.iter().any(|a| a.profile(name).is_some())
    }
}
