//! Test fixtures shared across modules.

use std::sync::Arc;

use rankdef_core::{
    ArgumentDef, AttributeFields, DeployProperties, FunctionDef, RankProfileDef, SchemaDef,
    ValueType,
};
use rankdef_properties::Property;

use crate::profile::CompiledRankProfile;
use crate::registry::{
    InMemoryFileRegistry, InMemoryProfileRegistry, ProfileRegistry, QueryProfileTypes,
};
use crate::rewrite::TypeEnv;
use crate::schedule::DeriveCtx;

pub const SCHEMA: &str = "doc";

/// A non-inline function with untyped parameters.
pub fn function(name: &str, params: &[&str], body: &str) -> FunctionDef {
    FunctionDef {
        arguments: params
            .iter()
            .map(|p| ArgumentDef {
                name: p.to_string(),
                value_type: None,
            })
            .collect(),
        ..FunctionDef::new(name, body)
    }
}

pub fn inline_function(name: &str, params: &[&str], body: &str) -> FunctionDef {
    FunctionDef {
        inline: true,
        ..function(name, params, body)
    }
}

pub fn schema(profiles: Vec<RankProfileDef>) -> SchemaDef {
    SchemaDef {
        profiles,
        ..SchemaDef::new(SCHEMA)
    }
}

/// Resolve `def` the way the registry would, inheriting the implicit default.
pub fn resolve(def: RankProfileDef) -> Arc<CompiledRankProfile> {
    let name = def.name.clone();
    InMemoryProfileRegistry::new([schema(vec![def])])
        .resolve(SCHEMA, &name)
        .unwrap()
}

/// Owned collaborators for one derivation.
#[derive(Default)]
pub struct Fixture {
    pub schema: Option<SchemaDef>,
    pub registry: InMemoryProfileRegistry,
    pub attributes: AttributeFields,
    pub query_profiles: QueryProfileTypes,
    pub files: InMemoryFileRegistry,
    pub deploy: DeployProperties,
}

impl Fixture {
    pub fn new(schema: SchemaDef) -> Self {
        Self {
            registry: InMemoryProfileRegistry::new([schema.clone()]),
            schema: Some(schema),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, name: &str, value_type: &str) -> Self {
        self.attributes.insert(name, value_type);
        self
    }

    pub fn with_deploy(mut self, deploy: DeployProperties) -> Self {
        self.deploy = deploy;
        self
    }

    pub fn ctx(&self) -> DeriveCtx<'_> {
        DeriveCtx::new(
            self.schema.as_ref(),
            &self.registry,
            &self.attributes,
            &self.query_profiles,
            &self.files,
            &self.deploy,
        )
    }

    pub fn types(&self) -> TypeEnv<'_> {
        self.ctx().types()
    }
}

/// Value of the only property with `key`.
pub fn value<'p>(properties: &'p [Property], key: &str) -> &'p str {
    let mut found = properties.iter().filter(|p| p.key == key);
    let property = found
        .next()
        .unwrap_or_else(|| panic!("no property `{key}`"));
    assert!(found.next().is_none(), "property `{key}` is repeated");
    &property.value
}

pub fn keys(properties: &[Property]) -> Vec<&str> {
    properties.iter().map(|p| p.key.as_str()).collect()
}

pub fn tensor(text: &str) -> ValueType {
    ValueType::new(text)
}
