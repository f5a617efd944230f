//! Expression and feature rewriting ahead of property emission.
//!
//! Order matters and is fixed by the profile compiler: declared features
//! first, then phase expressions, then model inputs, then any function not
//! reached so far. All of them share one [`SerializationContext`].

mod context;
mod features;

#[cfg(test)]
mod features_tests;

pub use context::{SerializationContext, SerializedFunction, TypeEnv, backend_feature_name};
pub use features::{ExpandedFeatures, expand_features, rewrite_models};
