//! Collaborators of a derivation: where profiles come from, where large
//! files go, and what query profiles declare.

mod files;
mod profiles;
mod query_profiles;

#[cfg(test)]
mod files_tests;

pub use files::{FileReference, FileRegistry, InMemoryFileRegistry};
pub use profiles::{InMemoryProfileRegistry, ProfileRegistry};
pub use query_profiles::{QueryProfileRegistry, QueryProfileTypes};
