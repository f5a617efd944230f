//! Deploy-time properties and feature flags.

use serde::{Deserialize, Serialize};

const DEFAULT_LARGE_RANK_EXPRESSION_LIMIT: usize = 8192;

/// Properties of the deployment a derivation runs for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployProperties {
    /// Serialized expressions longer than this (in bytes) are distributed as
    /// files instead of being kept inline.
    pub large_rank_expression_limit: usize,
    /// Size of the compilation worker pool. `0` uses the available parallelism.
    pub worker_threads: usize,
    pub sort_blueprints_by_cost: bool,
    pub always_mark_phrase_expensive: bool,
}

impl Default for DeployProperties {
    fn default() -> Self {
        Self {
            large_rank_expression_limit: DEFAULT_LARGE_RANK_EXPRESSION_LIMIT,
            worker_threads: 0,
            sort_blueprints_by_cost: false,
            always_mark_phrase_expensive: false,
        }
    }
}

impl DeployProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_large_rank_expression_limit(mut self, limit: usize) -> Self {
        self.large_rank_expression_limit = limit;
        self
    }

    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads;
        self
    }

    pub fn with_sort_blueprints_by_cost(mut self, enabled: bool) -> Self {
        self.sort_blueprints_by_cost = enabled;
        self
    }

    pub fn with_always_mark_phrase_expensive(mut self, enabled: bool) -> Self {
        self.always_mark_phrase_expensive = enabled;
        self
    }

    /// Worker pool size with `0` resolved to the machine's parallelism.
    pub fn effective_worker_threads(&self) -> usize {
        if self.worker_threads > 0 {
            return self.worker_threads;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}
