//! rankdef compiler: derives serving-node rank profile configuration.
//!
//! The pipeline, leaves first:
//! - `expr` - ranking expression lexer, parser and tree
//! - `rewrite` - function inlining, feature renames and type inference
//! - `native` - native rank type tables
//! - `externalize` - moves oversized expressions out to distributed files
//! - `profile` - resolved rank profiles and the single-profile compiler
//! - `registry` - profile, file and query-profile collaborators
//! - `schedule` - dependency-ordered parallel compilation of a schema
//! - `derive` - the derived configuration facade

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod derive;
pub mod expr;
pub mod externalize;
pub mod native;
pub mod profile;
pub mod registry;
pub mod rewrite;
pub mod schedule;

#[cfg(test)]
mod native_tests;
#[cfg(test)]
pub mod test_utils;

pub use derive::{
    DerivedConfiguration, DerivedExport, OnnxModelConfig, RankProfileConfig, RankingConstantConfig,
};
pub use expr::{Expr, ParseError, parse};
pub use profile::{CompiledRankProfile, MAX_PROPERTIES, RankingFunction, compile_profile};
pub use registry::{
    FileReference, FileRegistry, InMemoryFileRegistry, InMemoryProfileRegistry, ProfileRegistry,
    QueryProfileRegistry, QueryProfileTypes,
};
pub use schedule::{DeriveCtx, RankProfileList, compile_all};

use rankdef_core::RankType;
use rankdef_properties::CodecError;

/// Errors that abort a derivation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Two definitions of one shared constant or model disagree.
    #[error("{kind} '{name}' is defined differently in {first} and {second}")]
    ConfigurationConflict {
        kind: &'static str,
        name: String,
        first: String,
        second: String,
    },

    #[error("rank type '{rank_type}' of field '{field}' has no native table definition")]
    UnsupportedRankType { rank_type: RankType, field: String },

    #[error("invalid expression in {context}: {source}")]
    ExpressionParse {
        context: String,
        #[source]
        source: ParseError,
    },

    #[error("rank profile '{profile}' has {count} properties, the limit is {limit}")]
    PropertyOverflow {
        profile: String,
        count: usize,
        limit: usize,
    },

    /// Property content the codec cannot encode.
    #[error("property '{key}' of rank profile '{profile}' contains a reserved control character")]
    ReservedCharacter { profile: String, key: String },

    /// Failure inside a worker-pool compilation, surfaced when its wavefront
    /// is joined.
    #[error("failed compiling rank profile '{profile}': {source}")]
    TaskFailure {
        profile: String,
        #[source]
        source: Box<Error>,
    },

    #[error("rank profiles {} wait on parents that never become available", pending.join(", "))]
    SchedulingDeadlock { pending: Vec<String> },

    #[error("function '{function}' references itself through {}", chain.join(" -> "))]
    RecursiveFunction { function: String, chain: Vec<String> },

    #[error("function '{function}' takes {expected} arguments but is called with {found}")]
    FunctionArity {
        function: String,
        expected: usize,
        found: usize,
    },

    #[error("rank profile '{name}' not found in schema '{schema}'")]
    UnknownProfile { schema: String, name: String },

    #[error("rank profile inheritance cycle: {}", cycle.join(" -> "))]
    InheritanceCycle { cycle: Vec<String> },

    #[error("{kind} '{name}' refers to file '{path}' which is not registered")]
    MissingFile {
        kind: &'static str,
        name: String,
        path: String,
    },

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("failed to start compilation workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    /// The error behind any worker-pool wrapping.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::TaskFailure { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Result type for derivation operations.
pub type Result<T> = std::result::Result<T, Error>;
