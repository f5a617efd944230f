//! Loading of the schema model and the derivation's collaborators.

use std::fs;
use std::path::{Path, PathBuf};

use rankdef_compiler::{
    DeriveCtx, DerivedConfiguration, FileRegistry, InMemoryFileRegistry, InMemoryProfileRegistry,
    QueryProfileTypes,
};
use rankdef_core::{AttributeFields, ConstantSource, DeployProperties, SchemaDef};
use serde::de::DeserializeOwned;
use tracing::debug;

pub struct InputArgs {
    pub schema_path: PathBuf,
    pub schema_name: Option<String>,
    pub attributes: Option<PathBuf>,
    pub query_profiles: Option<PathBuf>,
    pub deploy: Option<PathBuf>,
    pub threads: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("'{path}' contains no schema")]
    NoSchema { path: String },

    #[error("schema '{name}' not found in '{path}'")]
    UnknownSchema { name: String, path: String },
}

/// Everything one derivation borrows, owned.
pub struct Inputs {
    pub schema: SchemaDef,
    pub registry: InMemoryProfileRegistry,
    pub attributes: AttributeFields,
    pub query_profiles: QueryProfileTypes,
    pub files: InMemoryFileRegistry,
    pub deploy: DeployProperties,
}

impl Inputs {
    pub fn load(args: &InputArgs) -> Result<Self, LoadError> {
        let schemas = read_schemas(&args.schema_path)?;
        let schema = select_schema(&schemas, args.schema_name.as_deref(), &args.schema_path)?;

        let attributes = match &args.attributes {
            Some(path) => read_json(path)?,
            None => AttributeFields::new(),
        };
        let query_profiles = match &args.query_profiles {
            Some(path) => read_json(path)?,
            None => QueryProfileTypes::new(),
        };
        let mut deploy: DeployProperties = match &args.deploy {
            Some(path) => read_json(path)?,
            None => DeployProperties::new(),
        };
        if let Some(threads) = args.threads {
            deploy = deploy.with_worker_threads(threads);
        }

        let files = InMemoryFileRegistry::new();
        let base = args.schema_path.parent().unwrap_or(Path::new("."));
        register_files(&schemas, base, &files);

        Ok(Self {
            schema,
            registry: InMemoryProfileRegistry::new(schemas),
            attributes,
            query_profiles,
            files,
            deploy,
        })
    }

    pub fn ctx(&self) -> DeriveCtx<'_> {
        DeriveCtx::new(
            Some(&self.schema),
            &self.registry,
            &self.attributes,
            &self.query_profiles,
            &self.files,
            &self.deploy,
        )
    }

    pub fn derive(&self) -> rankdef_compiler::Result<DerivedConfiguration> {
        DerivedConfiguration::derive(&self.ctx())
    }
}

fn read_text(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.display().to_string(),
        source,
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let text = read_text(path)?;
    serde_json::from_str(&text).map_err(|source| LoadError::Json {
        path: path.display().to_string(),
        source,
    })
}

/// A schema file holds one schema object or an array of them.
fn read_schemas(path: &Path) -> Result<Vec<SchemaDef>, LoadError> {
    let text = read_text(path)?;
    let parsed = if text.trim_start().starts_with('[') {
        rankdef_core::parse_schemas(&text)
    } else {
        rankdef_core::parse_schema(&text).map(|schema| vec![schema])
    };
    parsed.map_err(|source| LoadError::Json {
        path: path.display().to_string(),
        source,
    })
}

fn select_schema(
    schemas: &[SchemaDef],
    name: Option<&str>,
    path: &Path,
) -> Result<SchemaDef, LoadError> {
    let found = match name {
        Some(name) => schemas.iter().find(|s| s.name == name).ok_or_else(|| {
            LoadError::UnknownSchema {
                name: name.to_string(),
                path: path.display().to_string(),
            }
        })?,
        None => schemas.last().ok_or_else(|| LoadError::NoSchema {
            path: path.display().to_string(),
        })?,
    };
    Ok(found.clone())
}

/// Register every constant and model file that exists next to the schema.
///
/// Files are registered under the path the schema declares. Missing files
/// are left for the derivation to report.
fn register_files(schemas: &[SchemaDef], base: &Path, files: &InMemoryFileRegistry) {
    for path in declared_files(schemas) {
        if files.lookup(path).is_some() {
            continue;
        }
        let full = base.join(path);
        match fs::read(&full) {
            Ok(bytes) => {
                let reference = files.add_blob(path, &bytes);
                debug!(path, %reference, bytes = bytes.len(), "registered file");
            }
            Err(err) => debug!(path, %err, "file not registered"),
        }
    }
}

fn declared_files(schemas: &[SchemaDef]) -> Vec<&str> {
    let mut paths = Vec::new();
    for schema in schemas {
        let profiles = schema.profiles.iter();
        let constants = schema
            .constants
            .iter()
            .chain(profiles.clone().flat_map(|p| &p.constants));
        for constant in constants {
            if let ConstantSource::File(path) = &constant.source {
                paths.push(path.as_str());
            }
        }
        let models = schema
            .models
            .iter()
            .chain(profiles.flat_map(|p| &p.models));
        paths.extend(models.map(|m| m.path.as_str()));
    }
    paths
}
