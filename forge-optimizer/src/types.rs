//! Pluggable strategy traits that keep this crate free of a concrete
//! LLM-provider dependency (§9 "Meta-optimizer as pluggable strategy").

use forge_types::{Example, Module, OptimizerError, Prompt, RunMeta};

/// Synchronous module-evaluation callback (§4.3's `send!: Prompt → (ok,
/// raw, meta)`).
///
/// Kept as a trait object rather than a concrete transport so this crate
/// never depends on `forge-turn` or a provider crate; the caller supplies
/// whatever wiring it wants (a real streaming turn, a cached replay, a
/// test double).
pub trait Sender: Send + Sync {
    /// Send `prompt` and return whether the call itself succeeded, the raw
    /// assistant content, and call metadata. An `Err` here is the "single
    /// module evaluation raises" case from the failure policy (§4.3): the
    /// caller never panics, it always resolves to a `Result`.
    fn send(&self, prompt: &Prompt) -> Result<(bool, String, RunMeta), OptimizerError>;
}

/// Pluggable child-generation strategy for the evolution loop (§4.3 step 5,
/// §9). A real implementation wraps an LLM module plus its own transport;
/// this crate only needs the resulting `(Module, explanation)` pair.
pub trait MetaOptimizer: Send + Sync {
    /// Propose a new instruction/demo variant of `parent`, given the
    /// trainset it will be evaluated against.
    fn generate_variant(
        &self,
        parent: &Module,
        trainset: &[Example],
    ) -> Result<(Module, String), OptimizerError>;
}

/// Parameters governing one call to [`crate::evolve::evolve`] (§4.3).
#[derive(Debug, Clone, Copy)]
pub struct EvolutionParams {
    /// Number of trainset examples to attach as bootstrap demos.
    pub k_demos: usize,
    /// Children generated per sampled parent bin, per generation.
    pub n_per_gen: usize,
    /// Number of evolution generations to run.
    pub iterations: usize,
    /// Whether to run the meta-optimizer-driven evolution loop at all
    /// (when `false`, only the seed fan-out is evaluated).
    pub use_meta: bool,
    /// Point-cloud size above which `evolve` prunes after every generation
    /// (§4.3 "Point-cloud pruning"). Defaults to
    /// [`crate::OptimizerConfig::default`]'s `max_cloud_size`.
    pub max_cloud_size: usize,
    /// Fraction of generations that sample a parent bin uniformly at random
    /// rather than favoring the current best bin (§6 `EXPLORATION_RATE`).
    /// Defaults to [`crate::OptimizerConfig::default`]'s `exploration_rate`.
    pub exploration_rate: f64,
}

impl Default for EvolutionParams {
    fn default() -> Self {
        let optimizer_defaults = crate::config::OptimizerConfig::default();
        Self {
            k_demos: 3,
            n_per_gen: 2,
            iterations: 0,
            use_meta: false,
            max_cloud_size: optimizer_defaults.max_cloud_size,
            exploration_rate: optimizer_defaults.exploration_rate,
        }
    }
}
