#![deny(missing_docs)]
//! Streaming SSE tool-calling turn engine for Chrysalis Forge (§4.6, §5).
//!
//! One call to [`run_turn`] drives a single assistant turn end to end: send
//! the request, read the SSE body on a dedicated reader task, coalesce text
//! deltas and accumulate tool-call deltas on the consumer side, then
//! dispatch every accumulated tool call in ascending index order once the
//! stream closes.

mod config;
mod consumer;
mod engine;
mod reader;
mod tool_dispatch;
mod types;

pub use config::{AuthScheme, TurnConfig};
pub use engine::run_turn;
pub use types::{AssistantMessage, ToolCall, ToolResultMessage, TurnOutcome, TurnRequest, TurnState};
