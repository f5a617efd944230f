use rankdef_core::{AttributeFields, ConstantDef, DeployProperties, ModelDef, SchemaDef};

use crate::registry::{FileRegistry, ProfileRegistry, QueryProfileRegistry};
use crate::rewrite::TypeEnv;

/// Everything one derivation reads, borrowed from the caller.
///
/// Shared by reference with every worker-pool task; all collaborators are
/// `Sync`.
#[derive(Clone, Copy)]
pub struct DeriveCtx<'a> {
    /// The schema being derived. Without one there is nothing to compile.
    pub schema: Option<&'a SchemaDef>,
    pub profiles: &'a dyn ProfileRegistry,
    pub attributes: &'a AttributeFields,
    pub query_profiles: &'a dyn QueryProfileRegistry,
    pub files: &'a dyn FileRegistry,
    pub deploy: &'a DeployProperties,
}

impl<'a> DeriveCtx<'a> {
    pub fn new(
        schema: Option<&'a SchemaDef>,
        profiles: &'a dyn ProfileRegistry,
        attributes: &'a AttributeFields,
        query_profiles: &'a dyn QueryProfileRegistry,
        files: &'a dyn FileRegistry,
        deploy: &'a DeployProperties,
    ) -> Self {
        Self {
            schema,
            profiles,
            attributes,
            query_profiles,
            files,
            deploy,
        }
    }

    /// Constants declared on the schema itself.
    pub fn schema_constants(&self) -> &'a [ConstantDef] {
        self.schema.map_or(&[][..], |s| s.constants.as_slice())
    }

    pub fn schema_models(&self) -> &'a [ModelDef] {
        self.schema.map_or(&[][..], |s| s.models.as_slice())
    }

    pub fn types(&self) -> TypeEnv<'a> {
        TypeEnv {
            attributes: self.attributes,
            query_profiles: self.query_profiles,
            schema_constants: self.schema_constants(),
        }
    }
}
