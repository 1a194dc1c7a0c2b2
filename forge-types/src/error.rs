//! Shared error taxonomy (§7), one enum per failure domain.
//!
//! Only transport-level failures, cancellation, and archive-empty ever
//! propagate as raises to a caller. Tool failures, JSON parse failures, and
//! missing pricing entries are represented in-band (`RunResult { ok: false
//! }`, `Finish { error: true }`, cost treated as `0`) rather than raised —
//! see each subsystem's doc comments for where that in-band representation
//! lives.

use std::time::Duration;

/// Errors raised by the streaming turn engine.
///
/// Everything else the engine observes (a single tool call failing, a
/// response that fails strict-JSON parsing) is folded into the normal
/// return value instead of this enum.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    /// Non-200 response from the upstream transport.
    #[error("http {status}: {body_excerpt}{}", hint_suffix(hint))]
    Http {
        /// HTTP status code.
        status: u16,
        /// Best-effort excerpt of the error body (parsed `error.message` or
        /// raw text).
        body_excerpt: String,
        /// Model id that was attempted, for the "verify MODEL" hint.
        model: String,
        /// Hint text, populated when the body excerpt mentions "model".
        hint: Option<String>,
    },
    /// Mid-stream read or JSON-parse failure after a successful connect.
    #[error("stream error: {cause}")]
    Stream {
        /// Description of the underlying failure.
        cause: String,
        /// The underlying error, if one is available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
    /// Wall-clock turn timeout exceeded.
    #[error("timeout after {0:?}")]
    Timeout(Duration),
    /// `is_cancelled` became true mid-turn.
    #[error("cancelled")]
    Cancelled,
    /// Any other transport-level error.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

fn hint_suffix(hint: &Option<String>) -> String {
    match hint {
        Some(h) => format!(" ({h})"),
        None => String::new(),
    }
}

impl TurnError {
    /// Build an [`TurnError::Http`] variant, attaching a "verify MODEL" hint
    /// when `body_excerpt` mentions "model" (case-insensitive).
    pub fn http(status: u16, body_excerpt: impl Into<String>, model: impl Into<String>) -> Self {
        let body_excerpt = body_excerpt.into();
        let hint = body_excerpt
            .to_ascii_lowercase()
            .contains("model")
            .then(|| "verify the MODEL setting is correct for this provider".to_string());
        Self::Http {
            status,
            body_excerpt,
            model: model.into(),
            hint,
        }
    }

    /// Whether this error is likely transient and the turn can be retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            TurnError::Http { status, .. } => *status == 429 || *status >= 500,
            TurnError::Stream { .. } | TurnError::Timeout(_) => true,
            TurnError::Cancelled | TurnError::Other(_) => false,
        }
    }
}

/// Errors a [`crate::error`]-consuming `ToolRunner` implementation can
/// return from a tool invocation.
///
/// Caught by the turn engine and converted in-band into `Finish { error:
/// true, output: message }` plus a tool-result message — never raised to
/// the caller (§7 `ToolFailure`).
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The requested tool name is not registered.
    #[error("tool not found: {0}")]
    NotFound(String),
    /// The arguments given to the tool were invalid.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The tool ran but failed.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
    /// Any other tool error.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// Errors raised by the elite selector.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SelectorError {
    /// The archive has zero bins and an empty point-cloud; there is no
    /// elite to return.
    #[error("archive is empty: no bins and no point-cloud entries")]
    ArchiveEmpty,
}

/// Errors raised by the MAP-Elites optimizer.
#[derive(Debug, thiserror::Error)]
pub enum OptimizerError {
    /// A trainset example is missing one or more of the signature's
    /// required input fields. Unlike a single bad candidate evaluation
    /// (scored 0.1, never fatal), a malformed trainset is fatal (§4.3
    /// failure policy).
    #[error("trainset example {index} is missing required input field(s): {missing:?}")]
    TrainsetMismatch {
        /// Index of the offending example within the trainset.
        index: usize,
        /// Names of the missing required input fields.
        missing: Vec<String>,
    },
    /// Any other optimizer error.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_gets_model_hint_when_body_mentions_model() {
        let err = TurnError::http(400, "The model 'xyz' does not exist", "xyz");
        match err {
            TurnError::Http { hint, .. } => assert!(hint.is_some()),
            _ => panic!("expected Http variant"),
        }
    }

    #[test]
    fn http_error_no_hint_without_model_mention() {
        let err = TurnError::http(401, "unauthorized", "m1");
        match err {
            TurnError::Http { hint, .. } => assert!(hint.is_none()),
            _ => panic!("expected Http variant"),
        }
    }

    #[test]
    fn retryable_status_classes() {
        assert!(TurnError::http(429, "rate limited", "m1").is_retryable());
        assert!(TurnError::http(503, "unavailable", "m1").is_retryable());
        assert!(!TurnError::http(400, "bad request", "m1").is_retryable());
        assert!(!TurnError::Cancelled.is_retryable());
    }
}
