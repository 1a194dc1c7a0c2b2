#![deny(missing_docs)]
//! Core data model for Chrysalis Forge.
//!
//! Defines the shared types that flow between the module/signature runtime,
//! the scorer, the streaming turn engine, the MAP-Elites optimizer, and the
//! elite selector: [`Signature`], [`Module`], [`Ctx`], [`RunResult`],
//! [`Phenotype`], [`BinKey`], and the per-subsystem error taxonomy in
//! [`error`].

mod ctx;
mod error;
mod module;
mod phenotype;
mod result;
mod signature;

pub use ctx::Ctx;
pub use error::{OptimizerError, SelectorError, ToolError, TurnError};
pub use module::{Example, Module, ModuleError, Strategy};
pub use phenotype::{BinKey, CostBin, LatencyBin, Phenotype, Thresholds, UsageBin};
pub use result::{Prompt, RunMeta, RunResult};
pub use signature::{Field, Priority, Signature};
