/// PipelineRegistry - the extra passes a secondary effect asks the main
/// composer to run ahead of its own.
///
/// The producer (for example the holographic feedback setup) publishes a
/// list with `set()`; the consumer compares `generation()` against the
/// generation it last composed with and re-splices on change. Each write
/// replaces the whole list.

use std::sync::{Arc, PoisonError, RwLock};
use crate::composer::SharedPass;
use crate::engine_debug;

struct RegistryState {
    passes: Vec<SharedPass>,
    generation: u64,
}

/// Registry shared between producers and the composer
pub type SharedPipelineRegistry = Arc<PipelineRegistry>;

/// Pipeline registry
pub struct PipelineRegistry {
    state: RwLock<RegistryState>,
}

impl PipelineRegistry {
    /// Create an empty registry (generation 0)
    pub fn new() -> Self {
        Self {
            state: RwLock::new(RegistryState { passes: Vec::new(), generation: 0 }),
        }
    }

    /// Create an empty registry in its shared form
    pub fn shared() -> SharedPipelineRegistry {
        Arc::new(Self::new())
    }

    /// Replace the published passes and bump the generation
    pub fn set(&self, passes: Vec<SharedPass>) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.passes = passes;
        state.generation += 1;
        engine_debug!("portal3d::PipelineRegistry", "published {} pass(es), generation {}",
            state.passes.len(), state.generation);
    }

    /// Snapshot of the published passes
    pub fn get(&self) -> Vec<SharedPass> {
        self.state.read().unwrap_or_else(PoisonError::into_inner).passes.clone()
    }

    /// Snapshot of the published passes with the generation they belong to
    pub fn snapshot(&self) -> (Vec<SharedPass>, u64) {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        (state.passes.clone(), state.generation)
    }

    /// Incremented by every `set()` or `clear()`
    pub fn generation(&self) -> u64 {
        self.state.read().unwrap_or_else(PoisonError::into_inner).generation
    }

    pub fn len(&self) -> usize {
        self.state.read().unwrap_or_else(PoisonError::into_inner).passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Withdraw all passes
    pub fn clear(&self) {
        self.set(Vec::new());
    }
}

impl Default for PipelineRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "pipeline_registry_tests.rs"]
mod tests;
