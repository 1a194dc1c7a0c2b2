//! Environment-overridable turn configuration (§6 "Environment flags").

use std::time::Duration;

/// Default coalesced-flush interval: `FLUSH_INTERVAL_MS`.
const DEFAULT_FLUSH_INTERVAL_MS: u64 = 40;
/// Default coalesced-flush size threshold: `MAX_BATCH_CHARS`.
const DEFAULT_MAX_BATCH_CHARS: usize = 256;

/// Tunables for the consumer's coalesced-emit policy (§4.6).
///
/// Every field falls back to its default on an absent or malformed
/// environment variable, per §6: "Unknown vars are ignored; malformed
/// values fall back to defaults."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnConfig {
    /// Minimum time between coalesced `emit_text` flushes.
    pub flush_interval: Duration,
    /// Buffer size, in chars, that forces an immediate flush.
    pub max_batch_chars: usize,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            flush_interval: Duration::from_millis(DEFAULT_FLUSH_INTERVAL_MS),
            max_batch_chars: DEFAULT_MAX_BATCH_CHARS,
        }
    }
}

impl TurnConfig {
    /// Read `FLUSH_INTERVAL_MS` and `MAX_BATCH_CHARS` from the process
    /// environment, falling back to [`TurnConfig::default`] per-field.
    #[must_use]
    pub fn from_env() -> Self {
        let default = Self::default();
        let flush_interval = env_u64("FLUSH_INTERVAL_MS")
            .map(Duration::from_millis)
            .unwrap_or(default.flush_interval);
        let max_batch_chars = env_u64("MAX_BATCH_CHARS")
            .map(|n| n as usize)
            .unwrap_or(default.max_batch_chars);
        Self {
            flush_interval,
            max_batch_chars,
        }
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

/// Authentication scheme to use against the configured endpoint (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>`, used by OpenAI-compatible providers.
    Bearer,
    /// `X-API-Key: <key>`, used by the "Backboard" provider.
    ApiKey,
}

impl AuthScheme {
    /// Resolve the scheme for `endpoint`: `ApiKey` when the host is
    /// `backboard.io`, `Bearer` otherwise.
    #[must_use]
    pub fn for_endpoint(endpoint: &str) -> Self {
        if endpoint.contains("backboard.io") {
            AuthScheme::ApiKey
        } else {
            AuthScheme::Bearer
        }
    }

    /// The `(header name, header value)` pair to attach for `api_key`.
    #[must_use]
    pub fn header(&self, api_key: &str) -> (&'static str, String) {
        match self {
            AuthScheme::Bearer => ("authorization", format!("Bearer {api_key}")),
            AuthScheme::ApiKey => ("x-api-key", api_key.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_flush_policy() {
        let cfg = TurnConfig::default();
        assert_eq!(cfg.flush_interval, Duration::from_millis(40));
        assert_eq!(cfg.max_batch_chars, 256);
    }

    #[test]
    fn backboard_host_selects_api_key_scheme() {
        let scheme = AuthScheme::for_endpoint("https://backboard.io/api/chat/completions");
        assert_eq!(scheme, AuthScheme::ApiKey);
        let (name, value) = scheme.header("secret");
        assert_eq!(name, "x-api-key");
        assert_eq!(value, "secret");
    }

    #[test]
    fn openai_compatible_host_selects_bearer_scheme() {
        let scheme = AuthScheme::for_endpoint("https://api.openai.com/v1/chat/completions");
        assert_eq!(scheme, AuthScheme::Bearer);
        let (name, value) = scheme.header("secret");
        assert_eq!(name, "authorization");
        assert_eq!(value, "Bearer secret");
    }

    #[test]
    fn malformed_env_falls_back_to_default() {
        // SAFETY-equivalent: std::env::set_var is unsafe to call concurrently
        // with other threads reading the environment; this test runs
        // single-threaded within the crate's test binary for this var.
        unsafe {
            std::env::set_var("FLUSH_INTERVAL_MS", "not-a-number");
        }
        let cfg = TurnConfig::from_env();
        assert_eq!(cfg.flush_interval, Duration::from_millis(40));
        unsafe {
            std::env::remove_var("FLUSH_INTERVAL_MS");
        }
    }
}
