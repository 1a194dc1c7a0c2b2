//! Environment-overridable optimizer configuration (§6 "Environment flags").

/// Default point-cloud cap: `MAX_CLOUD_SIZE`.
const DEFAULT_MAX_CLOUD_SIZE: usize = 1000;
/// Default exploration rate: `EXPLORATION_RATE`.
const DEFAULT_EXPLORATION_RATE: f64 = 0.1;

/// Tunables for the MAP-Elites evolution loop.
///
/// Every field falls back to its default on an absent or malformed
/// environment variable (§6: "malformed values fall back to defaults").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizerConfig {
    /// Point-cloud size above which pruning kicks in.
    pub max_cloud_size: usize,
    /// Fraction of generations that sample a parent bin uniformly at random
    /// rather than favoring the current best bin, in `[0, 1]`.
    pub exploration_rate: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_cloud_size: DEFAULT_MAX_CLOUD_SIZE,
            exploration_rate: DEFAULT_EXPLORATION_RATE,
        }
    }
}

impl OptimizerConfig {
    /// Read `MAX_CLOUD_SIZE` and `EXPLORATION_RATE` from the process
    /// environment, falling back to [`OptimizerConfig::default`] per-field.
    /// `EXPLORATION_RATE` is additionally clamped to `[0, 1]`.
    #[must_use]
    pub fn from_env() -> Self {
        let default = Self::default();
        let max_cloud_size = std::env::var("MAX_CLOUD_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(default.max_cloud_size);
        let exploration_rate = std::env::var("EXPLORATION_RATE")
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|v| (0.0..=1.0).contains(v))
            .unwrap_or(default.exploration_rate);
        Self {
            max_cloud_size,
            exploration_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = OptimizerConfig::default();
        assert_eq!(cfg.max_cloud_size, 1000);
        assert_eq!(cfg.exploration_rate, 0.1);
    }

    #[test]
    fn malformed_env_falls_back_to_default() {
        unsafe {
            std::env::set_var("MAX_CLOUD_SIZE", "not-a-number");
            std::env::set_var("EXPLORATION_RATE", "3.0");
        }
        let cfg = OptimizerConfig::from_env();
        assert_eq!(cfg.max_cloud_size, 1000);
        assert_eq!(cfg.exploration_rate, 0.1);
        unsafe {
            std::env::remove_var("MAX_CLOUD_SIZE");
            std::env::remove_var("EXPLORATION_RATE");
        }
    }
}
