//! Orchestration: send the request, race the reader/consumer pair against a
//! wall-clock timeout, then dispatch any accumulated tool calls (§4.6).

use crate::config::{AuthScheme, TurnConfig};
use crate::tool_dispatch;
use crate::types::{AssistantMessage, TurnOutcome, TurnRequest};
use crate::{consumer, reader};
use forge_tool::{ToolEvent, ToolRunner};
use forge_types::TurnError;
use std::time::Instant;

const ERROR_BODY_EXCERPT_LIMIT: usize = 500;

/// Run one streaming turn against `request.endpoint`, emitting coalesced
/// text via `emit_text` and tool lifecycle events via `emit_tool`, and
/// dispatching finished tool calls through `tool_runner`.
///
/// `is_cancelled` is polled once per consumer tick; a cancellation mid-
/// stream raises [`TurnError::Cancelled`] after flushing any buffered text.
/// The whole turn is bounded by `request.timeout`.
pub async fn run_turn(
    client: &reqwest::Client,
    request: TurnRequest,
    config: &TurnConfig,
    tool_runner: &dyn ToolRunner,
    mut emit_text: impl FnMut(&str) + Send,
    mut emit_tool: impl FnMut(ToolEvent) + Send,
    mut is_cancelled: impl FnMut() -> bool + Send,
) -> Result<TurnOutcome, TurnError> {
    tokio::time::timeout(
        request.timeout,
        run_turn_inner(
            client,
            &request,
            config,
            tool_runner,
            &mut emit_text,
            &mut emit_tool,
            &mut is_cancelled,
        ),
    )
    .await
    .unwrap_or(Err(TurnError::Timeout(request.timeout)))
}

async fn run_turn_inner(
    client: &reqwest::Client,
    request: &TurnRequest,
    config: &TurnConfig,
    tool_runner: &dyn ToolRunner,
    emit_text: &mut (impl FnMut(&str) + Send),
    emit_tool: &mut (impl FnMut(ToolEvent) + Send),
    is_cancelled: &mut (impl FnMut() -> bool + Send),
) -> Result<TurnOutcome, TurnError> {
    let start = Instant::now();
    let scheme = AuthScheme::for_endpoint(&request.endpoint);
    let (auth_name, auth_value) = scheme.header(&request.api_key);

    let mut builder = client
        .post(&request.endpoint)
        .header(auth_name, auth_value)
        .json(&request.payload);
    for (name, value) in &request.headers {
        builder = builder.header(name, value);
    }

    let response = builder
        .send()
        .await
        .map_err(|e| TurnError::Stream {
            cause: format!("request send failed: {e}"),
            source: Some(Box::new(e)),
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let excerpt = extract_error_excerpt(&body);
        return Err(TurnError::http(status.as_u16(), excerpt, request.model.clone()));
    }

    let (tx, rx) = tokio::sync::mpsc::channel(256);
    tokio::spawn(reader::run(response, tx));

    let consumed = consumer::run(rx, config, &mut *emit_text, &mut *is_cancelled).await?;

    let (tool_calls, tool_results) = tool_dispatch::dispatch(consumed.tool_calls, tool_runner, &mut *emit_tool);

    let content = if tool_calls.is_empty() || !consumed.full_text.is_empty() {
        Some(consumed.full_text)
    } else {
        None
    };

    let mut usage = consumed.usage.unwrap_or_default();
    usage.elapsed_ms = start.elapsed().as_millis() as u64;

    Ok(TurnOutcome {
        assistant: AssistantMessage { content, tool_calls },
        tool_results,
        usage,
    })
}

/// Best-effort extraction of `{"error": {"message": "..."}}` from an error
/// body, falling back to a truncated raw excerpt.
fn extract_error_excerpt(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = value
            .get("error")
            .and_then(|e| e.get("message").or(Some(e)))
            .and_then(|m| m.as_str())
        {
            return message.to_string();
        }
    }
    body.chars().take(ERROR_BODY_EXCERPT_LIMIT).collect()
}
