//! Sequential, ascending-index tool dispatch after the stream closes
//! (§4.6 "Tool dispatch").

use crate::types::{ToolCall, ToolCallAccum, ToolResultMessage};
use forge_tool::{ToolEvent, ToolRunner};
use std::collections::BTreeMap;

/// Dispatch every accumulated tool call in ascending index order, emitting
/// `Start`/`Progress`/`Finish` lifecycle events around each synchronous
/// [`ToolRunner::run`] invocation.
///
/// A tool call whose accumulated arguments fail to parse as JSON is still
/// invoked, with `{}` substituted for its arguments (§4.6 step 1,
/// "recoverable-error" — still invoked, just logged).
pub(crate) fn dispatch(
    accums: BTreeMap<usize, ToolCallAccum>,
    tool_runner: &dyn ToolRunner,
    mut emit_tool: impl FnMut(ToolEvent),
) -> (Vec<ToolCall>, Vec<ToolResultMessage>) {
    let mut calls = Vec::with_capacity(accums.len());
    let mut results = Vec::with_capacity(accums.len());

    // BTreeMap iteration is already ascending by index.
    for (_, accum) in accums {
        let id = accum.id.unwrap_or_default();
        let name = accum.name.unwrap_or_default();
        let args_raw = accum.args_raw;

        let args: serde_json::Value = serde_json::from_str(&args_raw).unwrap_or_else(|_| {
            tracing::warn!(tool = %name, id = %id, "tool call arguments failed to parse; invoking with {{}}");
            serde_json::json!({})
        });

        emit_tool(ToolEvent::Start {
            id: id.clone(),
            name: name.clone(),
            args_raw: args_raw.clone(),
        });
        emit_tool(ToolEvent::Progress { id: id.clone() });

        let (error, output) = match tool_runner.run(&name, args) {
            Ok(value) => (false, stringify(&value)),
            Err(e) => (true, e.to_string()),
        };

        emit_tool(ToolEvent::Finish {
            id: id.clone(),
            error,
            output: output.clone(),
        });

        calls.push(ToolCall {
            id: id.clone(),
            name: name.clone(),
            arguments: args_raw,
        });
        results.push(ToolResultMessage {
            tool_call_id: id,
            name,
            content: output,
        });
    }

    (calls, results)
}

fn stringify(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
