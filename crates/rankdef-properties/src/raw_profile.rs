//! Compiled, compressed rank profile.

use rankdef_core::{ConstantDef, ModelDef};

use crate::{CodecError, Property, codec};

/// The derived form of one rank profile.
///
/// Holds only flattened strings: the compressed property blob and the small
/// set of shared assets the profile references. `models` are the profile's
/// declarations; `backend_models` are every model the profile can use with
/// inputs rewritten for it. Nothing is mutated after construction; the value
/// lives until the next deployment replaces it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawRankProfile {
    name: String,
    blob: Box<[u8]>,
    property_count: usize,
    constants: Vec<ConstantDef>,
    models: Vec<ModelDef>,
    backend_models: Vec<ModelDef>,
}

impl RawRankProfile {
    pub fn new(
        name: impl Into<String>,
        properties: &[Property],
        constants: Vec<ConstantDef>,
        models: Vec<ModelDef>,
    ) -> Result<Self, CodecError> {
        Ok(Self {
            name: name.into(),
            blob: codec::compress(properties)?.into_boxed_slice(),
            property_count: properties.len(),
            constants,
            models,
            backend_models: Vec::new(),
        })
    }

    pub fn with_backend_models(mut self, models: Vec<ModelDef>) -> Self {
        self.backend_models = models;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Decompress the property list. Not cached.
    pub fn properties(&self) -> Result<Vec<Property>, CodecError> {
        codec::decompress(&self.blob)
    }

    pub fn compressed(&self) -> &[u8] {
        &self.blob
    }

    pub fn property_count(&self) -> usize {
        self.property_count
    }

    pub fn constants(&self) -> &[ConstantDef] {
        &self.constants
    }

    pub fn models(&self) -> &[ModelDef] {
        &self.models
    }

    pub fn backend_models(&self) -> &[ModelDef] {
        &self.backend_models
    }
}
