#![deny(missing_docs)]
//! Tool interface and lifecycle events consumed by the streaming turn
//! engine.
//!
//! [`ToolRunner`] is the opaque, object-safe, **synchronous-from-the-
//! engine's-view** entry point the engine calls between turns (§6). It is
//! grounded in the donor workspace's `ToolDyn` (object-safe, stored behind
//! `Arc<dyn Trait>`) but synchronous per §4.6: implementations that need to
//! do async I/O internally are expected to block on their own runtime
//! handle rather than exposing an `async fn` across this boundary, so the
//! turn engine's tool-dispatch loop stays a plain sequential `for` loop.

use forge_types::ToolError;
use std::collections::HashMap;
use std::sync::Arc;

/// A single named tool, object-safe so it can be stored as `Arc<dyn Tool>`
/// in a [`ToolRegistry`].
pub trait Tool: Send + Sync {
    /// The tool's unique name.
    fn name(&self) -> &str;

    /// Human-readable description of what the tool does.
    fn description(&self) -> &str;

    /// JSON Schema for the tool's input parameters.
    fn input_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given arguments, blocking the calling
    /// thread until complete.
    fn call(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError>;
}

/// Opaque synchronous tool invocation, called by the turn engine between
/// turns (§6 "Tool Runner (consumed, not implemented here)").
///
/// The engine stringifies non-string results via JSON. A runner may have
/// side effects; the engine makes no assumption about idempotence.
pub trait ToolRunner: Send + Sync {
    /// Invoke the named tool with the given arguments, returning either a
    /// bare string or a JSON value (the engine stringifies the latter).
    fn run(&self, name: &str, args: serde_json::Value) -> Result<serde_json::Value, ToolError>;
}

/// Registry of [`Tool`]s, dispatching [`ToolRunner::run`] calls by name.
///
/// The common way to obtain a [`ToolRunner`]: register concrete tools, then
/// hand the registry itself (it implements `ToolRunner`) to the turn
/// engine.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Overwrites any existing tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl ToolRunner for ToolRegistry {
    fn run(&self, name: &str, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        tool.call(args)
    }
}

/// Per-tool-call lifecycle events emitted by the turn engine's tool
/// dispatch loop (§4.6 step 2-3).
#[derive(Debug, Clone, PartialEq)]
pub enum ToolEvent {
    /// Dispatch is about to begin for this call.
    Start {
        /// The tool call's id (from the upstream delta accumulation).
        id: String,
        /// Tool name.
        name: String,
        /// Raw (pre-parse) JSON arguments string.
        args_raw: String,
    },
    /// Dispatch is underway. Emitted once, immediately after `Start`; real
    /// deployments may emit additional `Progress` events from inside a
    /// long-running [`Tool::call`], which this type does not constrain.
    Progress {
        /// The tool call's id.
        id: String,
    },
    /// Dispatch completed, successfully or not.
    Finish {
        /// The tool call's id.
        id: String,
        /// Whether the tool call errored.
        error: bool,
        /// Stringified output (or error message, when `error` is true).
        output: String,
    },
}
