#![deny(missing_docs)]
//! MAP-Elites module archive and evolutionary optimizer for Chrysalis Forge
//! (§3, §4.3, §4.4).
//!
//! A [`ModuleArchive`] holds one elite [`forge_types::Module`] per discrete
//! [`forge_types::BinKey`], plus a continuous point-cloud of every observed
//! `(Phenotype, Module)` pair for nearest-neighbor dispatch. [`evolve`] runs
//! the full bootstrap-then-evolve loop described in §4.3 against a
//! caller-supplied [`Sender`] and, optionally, a [`MetaOptimizer`] — this
//! crate never depends on a concrete LLM transport.

mod archive;
mod config;
mod evolve;
mod phenotype;
mod types;

pub use archive::{ArchiveSnapshot, ModuleArchive};
pub use config::OptimizerConfig;
pub use evolve::{evolve, validate_trainset};
pub use phenotype::{bin_of, median, phenotype_of, thresholds_from_metas};
pub use types::{EvolutionParams, MetaOptimizer, Sender};
