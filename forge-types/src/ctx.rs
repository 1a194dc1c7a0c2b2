//! Execution context threaded explicitly through calls, replacing ambient
//! dynamic parameters (identity, theme, debug level) with an explicit
//! struct per DESIGN.md's "parameter-style ambient state" decision.

use crate::signature::Priority;
use serde::{Deserialize, Serialize};

/// Role of a message author in a rendered conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions.
    System,
    /// End-user message.
    User,
    /// Model-authored message.
    Assistant,
    /// Tool-result message.
    Tool,
}

/// A rendered prompt fragment: plain text or an image reference.
///
/// Produced by `render_prompt` when an input value is a URL with an image
/// scheme or extension (`data:image/*`, `.png`/`.jpg`/`.jpeg`
/// case-insensitive).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text block.
    Text {
        /// The text content.
        text: String,
    },
    /// Image reference block.
    ImageUrl {
        /// The image URL (may be a `data:` URI).
        url: String,
    },
}

/// One message in a conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author role.
    pub role: Role,
    /// Content blocks, in order.
    pub content: Vec<ContentBlock>,
    /// For `Role::Tool` messages, the id of the tool call this responds to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// For `Role::Tool` messages, the invoked tool's name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    /// Construct a plain-text message for `role`.
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: vec![ContentBlock::Text { text: text.into() }],
            tool_call_id: None,
            name: None,
        }
    }

    /// Construct a tool-result message.
    pub fn tool_result(tool_call_id: impl Into<String>, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: vec![ContentBlock::Text {
                text: content.into(),
            }],
            tool_call_id: Some(tool_call_id.into()),
            name: Some(name.into()),
        }
    }
}

/// Execution mode hint (e.g. "chat", "batch", "eval"). Free-form, consumed
/// by the caller's own dispatch logic; the engine does not branch on it.
pub type Mode = String;

/// The explicit, immutable context threaded through a single run.
///
/// `Ctx` is constructed once per call and never mutated (§3 lifecycle).
/// Outer layers are responsible for persistence across turns; this crate
/// holds no ambient/global state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ctx {
    /// System preamble prepended to every rendered prompt.
    pub system: String,
    /// Working-memory block, included in the rendered prompt only when
    /// non-empty.
    #[serde(default)]
    pub memory: String,
    /// Free-form hints about which tools are available/relevant.
    #[serde(default)]
    pub tool_hints: Vec<String>,
    /// Execution mode hint.
    #[serde(default)]
    pub mode: Mode,
    /// User-expressed preference, symbolic or natural-language.
    pub priority: Priority,
    /// Prior conversation turns.
    #[serde(default)]
    pub history: Vec<ChatMessage>,
    /// Summary standing in for history dropped by context compaction.
    #[serde(default)]
    pub compacted_summary: String,
}

impl Ctx {
    /// Construct a minimal context with the given system preamble and
    /// priority; all other fields default to empty.
    pub fn new(system: impl Into<String>, priority: Priority) -> Self {
        Self {
            system: system.into(),
            memory: String::new(),
            tool_hints: Vec::new(),
            mode: String::new(),
            priority,
            history: Vec::new(),
            compacted_summary: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctx_new_defaults_are_empty() {
        let ctx = Ctx::new("be helpful", Priority::Best);
        assert!(ctx.memory.is_empty());
        assert!(ctx.tool_hints.is_empty());
        assert!(ctx.history.is_empty());
        assert_eq!(ctx.priority, Priority::Best);
    }

    #[test]
    fn chat_message_tool_result_shape() {
        let msg = ChatMessage::tool_result("c1", "read_file", "ok");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("c1"));
        assert_eq!(msg.name.as_deref(), Some("read_file"));
    }
}
