#![deny(missing_docs)]
//! # forge — umbrella crate
//!
//! Single import surface for Chrysalis Forge's agent execution core.
//! Re-exports the protocol crates behind feature flags, plus a `prelude` for
//! the happy path, and the archive (de)serialization format (§6).

#[cfg(feature = "core")]
pub use forge_module;
#[cfg(feature = "core")]
pub use forge_scorer;
#[cfg(feature = "selector")]
pub use forge_selector;
#[cfg(feature = "core")]
pub use forge_tool;
#[cfg(feature = "core")]
pub use forge_types;
#[cfg(feature = "turn")]
pub use forge_turn;

#[cfg(feature = "optimizer")]
pub use forge_optimizer;

#[cfg(feature = "optimizer")]
pub mod archive;

/// Happy-path imports for composing Chrysalis Forge systems.
pub mod prelude {
    #[cfg(feature = "core")]
    pub use forge_types::{Ctx, Example, Field, Module, Priority, RunMeta, RunResult, Signature, Strategy};

    #[cfg(feature = "core")]
    pub use forge_module::{parse_response, parse_response_into_result, render_prompt};

    #[cfg(feature = "core")]
    pub use forge_scorer::{cost_usd, score, PriceTable};

    #[cfg(feature = "core")]
    pub use forge_tool::{Tool, ToolEvent, ToolRegistry, ToolRunner};

    #[cfg(feature = "turn")]
    pub use forge_turn::{run_turn, TurnConfig, TurnRequest, TurnState};

    #[cfg(feature = "optimizer")]
    pub use forge_optimizer::{evolve, EvolutionParams, MetaOptimizer, ModuleArchive, OptimizerConfig, Sender};

    #[cfg(feature = "selector")]
    pub use forge_selector::{select, PriorityClassifier};

    #[cfg(feature = "optimizer")]
    pub use crate::archive::{from_document, to_document, ArchiveDocument};
}
