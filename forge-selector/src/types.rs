//! A target point in phenotype space, and the pluggable classifier that can
//! produce one from arbitrary priority text (§4.5 step 1, §9 "Meta-optimizer
//! as pluggable strategy" — the same reasoning applies here to avoid this
//! crate depending on a concrete LLM module/transport).

/// The point in phenotype space a priority resolves to, before k-NN dispatch.
///
/// `accuracy` lives on the same raw `[0, 10]` scale as `Phenotype::accuracy`
/// and is min-max normalized against the point-cloud exactly like every
/// point's own accuracy. `latency`, `cost`, and `usage` are instead already
/// expressed as the desired *normalized* position on each axis (`0.0` =
/// fastest/cheapest/most compact, `1.0` = slowest/priciest/most verbose) —
/// the fixed keyword table's tuples mix both conventions, and both the
/// keyword table and [`PriorityJudgment::into_target`] are written to match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetPhenotype {
    /// Desired accuracy, raw `[0, 10]` scale.
    pub accuracy: f64,
    /// Desired latency, pre-normalized `[0, 1]` (0 = fastest).
    pub latency: f64,
    /// Desired cost, pre-normalized `[0, 1]` (0 = cheapest).
    pub cost: f64,
    /// Desired usage (token count), pre-normalized `[0, 1]` (0 = most
    /// compact).
    pub usage: f64,
}

impl TargetPhenotype {
    /// The neutral fallback target used when no keyword matches and no
    /// classifier is available (§4.5 step 1, §9 "ambiguous behavior").
    pub const NEUTRAL: TargetPhenotype = TargetPhenotype {
        accuracy: 5.0,
        latency: 0.5,
        cost: 0.5,
        usage: 0.5,
    };
}

/// A small LLM classifier's judgment of a free-text priority, each component
/// in `[0, 1]` (§4.5 step 1): how much the caller values accuracy, speed,
/// cost-consciousness, and brevity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriorityJudgment {
    /// Desired accuracy, `[0, 1]`.
    pub accuracy: f64,
    /// Desired speed, `[0, 1]` (1 = wants it fast).
    pub speed: f64,
    /// Cost-consciousness, `[0, 1]` (1 = wants it cheap).
    pub cost: f64,
    /// Desired brevity, `[0, 1]` (1 = wants it terse).
    pub brevity: f64,
}

impl PriorityJudgment {
    /// Clamp every component into `[0, 1]`, tolerating a classifier that
    /// doesn't itself bound its output.
    #[must_use]
    pub fn clamped(self) -> Self {
        let c = |v: f64| v.clamp(0.0, 1.0);
        Self {
            accuracy: c(self.accuracy),
            speed: c(self.speed),
            cost: c(self.cost),
            brevity: c(self.brevity),
        }
    }

    /// Map `(speed, cost, brevity)` onto their latency/cost/usage
    /// complements and `accuracy` onto the raw `[0, 10]` scale (§4.5 step 1:
    /// "map `(speed, cost, brevity)` to their latency/cost/usage
    /// complements").
    #[must_use]
    pub fn into_target(self) -> TargetPhenotype {
        let j = self.clamped();
        TargetPhenotype {
            accuracy: j.accuracy * 10.0,
            latency: 1.0 - j.speed,
            cost: 1.0 - j.cost,
            usage: 1.0 - j.brevity,
        }
    }
}

/// Pluggable priority-classification strategy (§4.5 step 1, §9): given
/// free-text priority that matched no fixed keyword, ask a small LLM module
/// for a structured judgment. Kept as a trait object so this crate never
/// depends on `forge-module` or a concrete transport — the same shape as
/// `forge_optimizer::MetaOptimizer`.
pub trait PriorityClassifier: Send + Sync {
    /// Classify `priority_text`, returning a judgment or any error the
    /// underlying call produced. Errors here are never propagated to the
    /// selector's caller (§9): a failed classification falls back to the
    /// neutral target, logged at `tracing::warn!`.
    fn classify(
        &self,
        priority_text: &str,
    ) -> Result<PriorityJudgment, Box<dyn std::error::Error + Send + Sync>>;
}
