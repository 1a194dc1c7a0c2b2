//! Phenotype and bin-key: the continuous and discrete behavioral
//! coordinates of a module's observed run.

use serde::{Deserialize, Serialize};

/// Continuous behavioral coordinates of one observed run.
///
/// Invariant: all components are finite and non-negative. Constructed only
/// through [`Phenotype::new`], which clamps negative/non-finite inputs to
/// `0.0` rather than panicking — a single malformed upstream `usage` block
/// must not abort an evolution generation (§4.3 failure policy).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Phenotype {
    /// Accuracy contribution in `[0, 10]`.
    pub accuracy: f64,
    /// Observed latency in milliseconds.
    pub latency_ms: f64,
    /// Observed cost in USD.
    pub cost_usd: f64,
    /// Observed total token count.
    pub total_tokens: f64,
}

impl Phenotype {
    /// Construct a phenotype, clamping any non-finite or negative component
    /// to `0.0`.
    pub fn new(accuracy: f64, latency_ms: f64, cost_usd: f64, total_tokens: f64) -> Self {
        let clamp = |v: f64| if v.is_finite() && v >= 0.0 { v } else { 0.0 };
        Self {
            accuracy: clamp(accuracy),
            latency_ms: clamp(latency_ms),
            cost_usd: clamp(cost_usd),
            total_tokens: clamp(total_tokens),
        }
    }

    /// The zero phenotype, used when a candidate evaluation fails (§4.3
    /// failure policy).
    pub const ZERO: Phenotype = Phenotype {
        accuracy: 0.0,
        latency_ms: 0.0,
        cost_usd: 0.0,
        total_tokens: 0.0,
    };

    /// This phenotype's four components as an array, in the fixed order
    /// `[accuracy, latency_ms, cost_usd, total_tokens]` used by the
    /// selector's k-NN normalization.
    pub fn as_array(&self) -> [f64; 4] {
        [self.accuracy, self.latency_ms, self.cost_usd, self.total_tokens]
    }
}

/// Discrete cost bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostBin {
    /// Below the cost threshold.
    Cheap,
    /// At or above the cost threshold.
    Premium,
}

/// Discrete latency bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LatencyBin {
    /// Below the latency threshold.
    Fast,
    /// At or above the latency threshold.
    Slow,
}

/// Discrete usage (token count) bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageBin {
    /// Below the usage threshold.
    Compact,
    /// At or above the usage threshold.
    Verbose,
}

/// Discrete label of a phenotype under the current thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BinKey {
    /// Cost bin.
    pub cost_bin: CostBin,
    /// Latency bin.
    pub latency_bin: LatencyBin,
    /// Usage bin.
    pub usage_bin: UsageBin,
}

impl BinKey {
    /// Whether this key's string form (`"cheap"`, `"fast"`, `"slow"`, ...)
    /// matches a symbolic tag, used by the selector's bin-shortcut (§4.5
    /// step 2). `"premium"` and `"slow"` only ever appear as cost/latency
    /// labels, never as symbolic priorities, but the lookup is still a
    /// plain substring-style match on each component's name.
    pub fn contains_tag(&self, tag: &str) -> bool {
        let tag = tag.to_ascii_lowercase();
        match tag.as_str() {
            "cheap" => self.cost_bin == CostBin::Cheap,
            "premium" => self.cost_bin == CostBin::Premium,
            "fast" => self.latency_bin == LatencyBin::Fast,
            "slow" => self.latency_bin == LatencyBin::Slow,
            "compact" => self.usage_bin == UsageBin::Compact,
            "verbose" => self.usage_bin == UsageBin::Verbose,
            _ => false,
        }
    }
}

/// Relative thresholds used to bin a [`crate::RunMeta`] into a [`BinKey`].
///
/// Derived from the median cost/latency/total-tokens of the seed
/// evaluations (§4.3 step 3), rather than fixed magic numbers, so bin
/// labels track the actual distribution of the model/provider in use.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Thresholds {
    /// Cost threshold in USD.
    pub cost: f64,
    /// Latency threshold in milliseconds.
    pub latency: f64,
    /// Usage (total token) threshold.
    pub usage: f64,
}
