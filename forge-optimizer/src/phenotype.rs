//! Phenotype mapping: deriving continuous coordinates and a discrete bin
//! key from observed run metadata (§4.4).

use forge_scorer::PriceTable;
use forge_types::{BinKey, CostBin, LatencyBin, Phenotype, RunMeta, Thresholds, UsageBin};

/// Derive the continuous [`Phenotype`] for one observed run.
///
/// `accuracy` is the *accuracy contribution* (`10.0` on exact match, `0.0`
/// otherwise) — not the penalized composite score the archive stores
/// alongside a bin, which is a separate number (§4.4: "the phenotype's
/// first component is the accuracy contribution used by the selector for
/// priority matching").
#[must_use]
pub fn phenotype_of(meta: &RunMeta, table: &PriceTable, accuracy: f64) -> Phenotype {
    let cost = table.cost_usd(&meta.model, meta.prompt_tokens, meta.completion_tokens);
    let usage = (meta.prompt_tokens + meta.completion_tokens) as f64;
    Phenotype::new(accuracy, meta.elapsed_ms as f64, cost, usage)
}

/// Derive the discrete [`BinKey`] for one observed run under `thresholds`.
///
/// With all-zero thresholds (the initialization state before the seed
/// median is known), every run bins to `(premium, slow, verbose)` since
/// none of its non-negative coordinates are strictly less than `0.0`
/// (§8 boundary behavior).
#[must_use]
pub fn bin_of(meta: &RunMeta, table: &PriceTable, thresholds: &Thresholds) -> BinKey {
    let cost = table.cost_usd(&meta.model, meta.prompt_tokens, meta.completion_tokens);
    let latency = meta.elapsed_ms as f64;
    let usage = (meta.prompt_tokens + meta.completion_tokens) as f64;
    BinKey {
        cost_bin: if cost < thresholds.cost {
            CostBin::Cheap
        } else {
            CostBin::Premium
        },
        latency_bin: if latency < thresholds.latency {
            LatencyBin::Fast
        } else {
            LatencyBin::Slow
        },
        usage_bin: if usage < thresholds.usage {
            UsageBin::Compact
        } else {
            UsageBin::Verbose
        },
    }
}

/// The median of a non-empty slice of `f64`s (sorted copy; average of the
/// two middle elements when the length is even).
#[must_use]
pub fn median(values: &[f64]) -> f64 {
    assert!(!values.is_empty(), "median of an empty slice is undefined");
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Derive [`Thresholds`] as the median cost/latency/total-tokens across a
/// set of seed [`RunMeta`]s (§4.3 step 3).
#[must_use]
pub fn thresholds_from_metas(metas: &[RunMeta], table: &PriceTable) -> Thresholds {
    let costs: Vec<f64> = metas
        .iter()
        .map(|m| table.cost_usd(&m.model, m.prompt_tokens, m.completion_tokens))
        .collect();
    let latencies: Vec<f64> = metas.iter().map(|m| m.elapsed_ms as f64).collect();
    let totals: Vec<f64> = metas
        .iter()
        .map(|m| (m.prompt_tokens + m.completion_tokens) as f64)
        .collect();
    Thresholds {
        cost: median(&costs),
        latency: median(&latencies),
        usage: median(&totals),
    }
}
