//! Resolved rank profiles and their compilation into properties.

mod compiled;
mod compiler;

#[cfg(test)]
mod compiler_tests;

pub use compiled::{CompiledRankProfile, RankingFunction};
pub use compiler::{MAX_PROPERTIES, compile_profile};
