//! Module: a prompting program (strategy + instructions + demos) targeting a
//! [`crate::Signature`].

use crate::signature::Signature;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prompting strategy. Affects prompt rendering only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Direct prediction: render inputs, ask for the strict-JSON output.
    Predict,
    /// Chain-of-thought: adds a "think step-by-step" hint and a hidden
    /// scratch field to the rendered prompt.
    ChainOfThought,
}

/// A few-shot example embedded in a prompt.
///
/// `inputs` and `expected` are `BTreeMap` rather than `HashMap` so that
/// rendered demo blocks are deterministic across runs (field order matches
/// the signature's declaration order when rendered; map order only matters
/// for round-trip equality checks).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    /// Input field name to value bindings.
    pub inputs: BTreeMap<String, serde_json::Value>,
    /// Expected output field name to value bindings.
    pub expected: BTreeMap<String, serde_json::Value>,
}

impl Example {
    /// Construct an example from the given bindings.
    pub fn new(
        inputs: BTreeMap<String, serde_json::Value>,
        expected: BTreeMap<String, serde_json::Value>,
    ) -> Self {
        Self { inputs, expected }
    }

    /// Whether this example's bindings conform to `signature`: its `inputs`
    /// keys are a subset of the signature's input field names, and its
    /// `expected` keys are a subset of the output field names.
    #[must_use]
    pub fn conforms_to(&self, signature: &Signature) -> bool {
        let input_names: std::collections::HashSet<&str> = signature.input_names().collect();
        let output_names: std::collections::HashSet<&str> = signature.output_names().collect();
        self.inputs.keys().all(|k| input_names.contains(k.as_str()))
            && self
                .expected
                .keys()
                .all(|k| output_names.contains(k.as_str()))
    }
}

/// Error raised when constructing a [`Module`] with demos that don't conform
/// to its signature.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ModuleError {
    /// A demo's input or output bindings use keys absent from the signature.
    #[error("demo at index {index} does not conform to signature {signature}")]
    NonConformingDemo {
        /// Index of the offending demo within `demos`.
        index: usize,
        /// Name of the signature the module targets.
        signature: String,
    },
}

/// A prompting program: a strategy plus instructions and demos, targeting a
/// fixed signature.
///
/// Modules are immutable once constructed (§3 lifecycle). Mutation during
/// evolution always produces a new `Module` value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    /// Stable identifier, unique within an archive.
    pub id: String,
    /// The signature this module implements.
    pub signature: Signature,
    /// Prompting strategy.
    pub strategy: Strategy,
    /// Instruction text prepended to every prompt.
    pub instructions: String,
    /// Zero or more few-shot demos.
    pub demos: Vec<Example>,
    /// Free-form strategy/provider parameters (temperature, etc.).
    #[serde(default)]
    pub params: serde_json::Value,
}

impl Module {
    /// Construct a module, validating that every demo's bindings conform to
    /// `signature`.
    pub fn new(
        id: impl Into<String>,
        signature: Signature,
        strategy: Strategy,
        instructions: impl Into<String>,
        demos: Vec<Example>,
    ) -> Result<Self, ModuleError> {
        for (index, demo) in demos.iter().enumerate() {
            if !demo.conforms_to(&signature) {
                return Err(ModuleError::NonConformingDemo {
                    index,
                    signature: signature.name.clone(),
                });
            }
        }
        Ok(Self {
            id: id.into(),
            signature,
            strategy,
            instructions: instructions.into(),
            demos,
            params: serde_json::Value::Null,
        })
    }

    /// Return a clone of this module with `instructions` replaced.
    ///
    /// Used by the optimizer's seed fan-out and by meta-optimizer mutation:
    /// both operations only ever change instructions/demos, never the
    /// signature or id's target semantics.
    #[must_use]
    pub fn with_instructions(&self, instructions: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
            ..self.clone()
        }
    }

    /// Return a clone of this module with `demos` replaced.
    #[must_use]
    pub fn with_demos(&self, demos: Vec<Example>) -> Self {
        Self {
            demos,
            ..self.clone()
        }
    }

    /// Return a clone of this module with a new `id`.
    #[must_use]
    pub fn with_id(&self, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..self.clone()
        }
    }
}
