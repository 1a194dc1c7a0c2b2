//! The result of a single module invocation.

use crate::ctx::ContentBlock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A rendered prompt: either a single text string or an ordered list of
/// content blocks (when an image input was detected).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Prompt {
    /// Text-only prompt.
    Text(String),
    /// Ordered content blocks (text interleaved with image references).
    Blocks(Vec<ContentBlock>),
}

impl Prompt {
    /// The concatenation of all text content in this prompt, ignoring image
    /// blocks. For `Prompt::Text` this is the string itself.
    pub fn text(&self) -> String {
        match self {
            Prompt::Text(s) => s.clone(),
            Prompt::Blocks(blocks) => blocks
                .iter()
                .filter_map(|b| match b {
                    ContentBlock::Text { text } => Some(text.as_str()),
                    ContentBlock::ImageUrl { .. } => None,
                })
                .collect::<Vec<_>>()
                .join(""),
        }
    }
}

/// Metadata about one upstream call, populated from the usage block and a
/// locally measured monotonic elapsed time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMeta {
    /// Model identifier actually used.
    pub model: String,
    /// Prompt (input) tokens consumed.
    pub prompt_tokens: u64,
    /// Completion (output) tokens generated.
    pub completion_tokens: u64,
    /// Wall-clock elapsed time, measured locally with a monotonic clock.
    pub elapsed_ms: u64,
    /// Upstream's stated reason the generation stopped.
    pub finish_reason: String,
}

impl RunMeta {
    /// Total tokens: `prompt_tokens + completion_tokens`.
    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// The outcome of a single module invocation.
///
/// `ok` is true iff the assistant content parsed as a JSON object and every
/// required output field was present (§4.1). Parse failures never raise —
/// they are represented in-band as `ok: false` with `outputs` empty and
/// `raw` preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Whether the response satisfied the signature's output contract.
    pub ok: bool,
    /// Parsed output field bindings. Empty when `ok` is false.
    pub outputs: BTreeMap<String, serde_json::Value>,
    /// Raw assistant content, preserved verbatim.
    pub raw: String,
    /// The prompt that was sent, for tracing/replay.
    pub prompt: Prompt,
    /// Call metadata.
    pub meta: RunMeta,
}

impl RunResult {
    /// Construct a failed result (`ok: false`, no outputs) carrying the raw
    /// content that failed to parse.
    pub fn failed(raw: impl Into<String>, prompt: Prompt, meta: RunMeta) -> Self {
        Self {
            ok: false,
            outputs: BTreeMap::new(),
            raw: raw.into(),
            prompt,
            meta,
        }
    }
}
