//! Wire-adjacent types for one streaming turn (§3, §4.6).

use std::time::Duration;

/// Top-level turn state machine (§4.6).
///
/// `Streaming` is not represented as an explicit variant here: the reader
/// and consumer run concurrently for its entire duration, and callers only
/// ever observe the terminal state via [`crate::engine::run_turn`]'s
/// `Result`. This enum exists to name the states in doc comments and tests
/// rather than to be threaded through as live data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// Establishing the HTTP connection; no bytes of the body read yet.
    Connecting,
    /// Reader and consumer tasks are running.
    Streaming,
    /// Stream closed; tool dispatch and result assembly underway.
    Finalizing,
    /// Turn completed successfully.
    Done,
    /// Turn ended in a raised error.
    Failed,
    /// Turn was cancelled via `is_cancelled`.
    Cancelled,
}

/// One line of the SSE body, tagged by the reader task (§4.6 "Reader").
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RawEvent {
    /// A `data: <json>` line, JSON text only (prefix stripped).
    Data(String),
    /// The `data: [DONE]` sentinel.
    Done,
    /// The body stream ended.
    Eof,
    /// A read failure occurred; the reader task stops after emitting this.
    Error(String),
}

/// In-progress accumulation of one tool-call's delta fragments, keyed by
/// the upstream's `index` (§4.6 "Consumer").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ToolCallAccum {
    pub(crate) id: Option<String>,
    pub(crate) name: Option<String>,
    pub(crate) args_raw: String,
}

/// One fully accumulated tool call, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    /// The call's id, as assigned by the upstream model.
    pub id: String,
    /// The tool's name.
    pub name: String,
    /// The raw (pre-parse) JSON arguments string.
    pub arguments: String,
}

/// The assistant's turn output (§4.6 "Outputs").
///
/// `content` is `None` iff `tool_calls` is non-empty and no text was ever
/// emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantMessage {
    /// Assistant text content, or `None` when the turn was tool-calls-only.
    pub content: Option<String>,
    /// Accumulated tool calls, in ascending index order.
    pub tool_calls: Vec<ToolCall>,
}

/// A rendered `{role: "tool", ...}` result message (§4.6 step 4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResultMessage {
    /// The tool call id this responds to.
    pub tool_call_id: String,
    /// The tool's name.
    pub name: String,
    /// Stringified tool output (or error message).
    pub content: String,
}

/// Everything the turn engine produces for one assistant turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// The assistant's message.
    pub assistant: AssistantMessage,
    /// Tool-result messages, in the order their calls were dispatched.
    pub tool_results: Vec<ToolResultMessage>,
    /// Call metadata, populated from the final `usage` block observed.
    pub usage: forge_types::RunMeta,
}

/// Everything needed to drive one turn against a chat-completions–style
/// endpoint (§4.6).
#[derive(Debug, Clone)]
pub struct TurnRequest {
    /// Bearer/API key credential.
    pub api_key: String,
    /// Full endpoint URL, e.g. `https://api.openai.com/v1/chat/completions`.
    pub endpoint: String,
    /// Additional request headers beyond the resolved auth header.
    pub headers: Vec<(String, String)>,
    /// The already-built request body (model, messages, tools, `stream:
    /// true`, `stream_options`, `response_format`, ...). Building this body
    /// from a [`forge_types::Ctx`]/[`forge_types::Module`] pairing — the
    /// spec's `payload_builder` — is the caller's responsibility; the
    /// engine only needs the finished JSON.
    pub payload: serde_json::Value,
    /// Model id being targeted, carried for the `HttpError` "verify MODEL"
    /// hint even when the body itself never echoes it back.
    pub model: String,
    /// Wall-clock timeout for the whole turn.
    pub timeout: Duration,
}
