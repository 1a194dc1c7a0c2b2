//! The consumer loop: coalesced text emission, tool-call delta
//! accumulation, and usage tracking (§4.6 "Consumer", §5).

use crate::types::{RawEvent, ToolCallAccum};
use forge_types::{RunMeta, TurnError};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::Receiver;

/// Accumulated state handed back to the engine once the stream closes.
#[derive(Debug, Default)]
pub(crate) struct ConsumerOutput {
    pub(crate) full_text: String,
    pub(crate) tool_calls: BTreeMap<usize, ToolCallAccum>,
    pub(crate) usage: Option<RunMeta>,
}

/// Drive the consumer side of one turn: receive [`RawEvent`]s from `rx`,
/// update accumulation state, and flush `emit_text` per the coalesced
/// policy in `config`. Polls `is_cancelled` once per tick.
///
/// Returns `Ok` once `Eof` is observed (whether or not `Done` preceded it —
/// tolerant close per §4.6), or `Err` on cancellation or a stream error.
pub(crate) async fn run(
    mut rx: Receiver<RawEvent>,
    config: &crate::config::TurnConfig,
    mut emit_text: impl FnMut(&str),
    mut is_cancelled: impl FnMut() -> bool,
) -> Result<ConsumerOutput, TurnError> {
    let mut out = ConsumerOutput::default();
    let mut buffer = String::new();
    let mut last_flush = Instant::now();

    loop {
        if is_cancelled() {
            flush(&mut buffer, &mut emit_text);
            return Err(TurnError::Cancelled);
        }

        let deadline = config.flush_interval.saturating_sub(last_flush.elapsed());
        let wait = deadline.max(Duration::from_millis(1));

        match tokio::time::timeout(wait, rx.recv()).await {
            Ok(Some(RawEvent::Data(text))) => {
                if let Err(e) = apply_data(&text, &mut out, &mut buffer) {
                    flush(&mut buffer, &mut emit_text);
                    return Err(TurnError::Stream {
                        cause: format!("JSON parse error in SSE data: {e}"),
                        source: None,
                    });
                }
                maybe_flush(&mut buffer, &mut emit_text, &mut last_flush, config);
            }
            Ok(Some(RawEvent::Done)) => {
                // Tolerant: keep looping until Eof actually closes the body.
            }
            Ok(Some(RawEvent::Eof)) | Ok(None) => break,
            Ok(Some(RawEvent::Error(msg))) => {
                flush(&mut buffer, &mut emit_text);
                return Err(TurnError::Stream {
                    cause: msg,
                    source: None,
                });
            }
            Err(_elapsed) => {
                maybe_flush(&mut buffer, &mut emit_text, &mut last_flush, config);
            }
        }
    }

    flush(&mut buffer, &mut emit_text);
    Ok(out)
}

fn flush(buffer: &mut String, emit_text: &mut impl FnMut(&str)) {
    if !buffer.is_empty() {
        emit_text(buffer);
        buffer.clear();
    }
}

fn maybe_flush(
    buffer: &mut String,
    emit_text: &mut impl FnMut(&str),
    last_flush: &mut Instant,
    config: &crate::config::TurnConfig,
) {
    let due = buffer.len() >= config.max_batch_chars || last_flush.elapsed() >= config.flush_interval;
    if due && !buffer.is_empty() {
        emit_text(buffer);
        buffer.clear();
        *last_flush = Instant::now();
    }
}

/// Apply one `data:` JSON payload: merge `usage`, append text content to
/// `out.full_text`/`buffer`, and accumulate tool-call deltas by index.
fn apply_data(
    json_text: &str,
    out: &mut ConsumerOutput,
    buffer: &mut String,
) -> Result<(), serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(json_text)?;

    if let Some(usage) = value.get("usage").filter(|u| !u.is_null()) {
        let model = value
            .get("model")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .or_else(|| out.usage.as_ref().map(|u| u.model.clone()))
            .unwrap_or_default();
        out.usage = Some(RunMeta {
            model,
            prompt_tokens: usage.get("prompt_tokens").and_then(|v| v.as_u64()).unwrap_or(0),
            completion_tokens: usage
                .get("completion_tokens")
                .and_then(|v| v.as_u64())
                .unwrap_or(0),
            elapsed_ms: 0, // overwritten by run_turn_inner with the measured wall-clock duration
            finish_reason: out
                .usage
                .as_ref()
                .map(|u| u.finish_reason.clone())
                .unwrap_or_default(),
        });
    }

    let Some(choices) = value.get("choices").and_then(|c| c.as_array()) else {
        return Ok(());
    };

    for choice in choices {
        if let Some(reason) = choice.get("finish_reason").and_then(|f| f.as_str()) {
            let entry = out.usage.get_or_insert_with(RunMeta::default);
            entry.finish_reason = reason.to_string();
        }

        let Some(delta) = choice.get("delta") else {
            continue;
        };

        if let Some(content) = delta.get("content").and_then(|c| c.as_str()) {
            out.full_text.push_str(content);
            buffer.push_str(content);
        }

        if let Some(tool_calls) = delta.get("tool_calls").and_then(|t| t.as_array()) {
            for tc in tool_calls {
                let index = tc.get("index").and_then(|i| i.as_u64()).unwrap_or(0) as usize;
                let entry = out.tool_calls.entry(index).or_default();

                if entry.id.is_none() {
                    if let Some(id) = tc.get("id").and_then(|v| v.as_str()).filter(|s| !s.is_empty()) {
                        entry.id = Some(id.to_string());
                    }
                }

                if let Some(function) = tc.get("function") {
                    if entry.name.is_none() {
                        if let Some(name) =
                            function.get("name").and_then(|v| v.as_str()).filter(|s| !s.is_empty())
                        {
                            entry.name = Some(name.to_string());
                        }
                    }
                    if let Some(args) = function.get("arguments").and_then(|v| v.as_str()) {
                        entry.args_raw.push_str(args);
                    }
                }
            }
        }
    }

    Ok(())
}
