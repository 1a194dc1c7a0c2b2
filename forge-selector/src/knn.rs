//! Min-max normalization and nearest-neighbor dispatch over a module
//! archive's point-cloud (§4.5 step 3).

use crate::types::TargetPhenotype;
use forge_types::{Module, Phenotype};

/// `(min, max)` over a non-empty iterator of `f64`s.
fn minmax(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), v| {
        (min.min(v), max.max(v))
    })
}

/// Normalize `value` into `[0, 1]` given the observed `[min, max]` range.
/// A zero-width range (every point identical on this dimension) maps to
/// `0.5` rather than dividing by zero (§4.5 step 3: "width-0 dims map to
/// 0.5").
fn normalize(value: f64, min: f64, max: f64) -> f64 {
    let width = max - min;
    if width <= 0.0 { 0.5 } else { (value - min) / width }
}

/// Per-dimension `[min, max]` ranges observed over a point-cloud.
struct Ranges {
    accuracy: (f64, f64),
    latency: (f64, f64),
    cost: (f64, f64),
    usage: (f64, f64),
}

impl Ranges {
    fn over(cloud: &[(Phenotype, Module)]) -> Self {
        Self {
            accuracy: minmax(cloud.iter().map(|(p, _)| p.accuracy)),
            latency: minmax(cloud.iter().map(|(p, _)| p.latency_ms)),
            cost: minmax(cloud.iter().map(|(p, _)| p.cost_usd)),
            usage: minmax(cloud.iter().map(|(p, _)| p.total_tokens)),
        }
    }

    fn normalize_point(&self, p: &Phenotype) -> [f64; 4] {
        [
            normalize(p.accuracy, self.accuracy.0, self.accuracy.1),
            normalize(p.latency_ms, self.latency.0, self.latency.1),
            normalize(p.cost_usd, self.cost.0, self.cost.1),
            normalize(p.total_tokens, self.usage.0, self.usage.1),
        ]
    }

    /// The target's accuracy dimension shares the points' raw `[0, 10]`
    /// scale, so it is min-max normalized the same way; latency/cost/usage
    /// are already expressed as the desired normalized position and are
    /// used as-is (see [`TargetPhenotype`]'s doc comment).
    fn normalize_target(&self, t: &TargetPhenotype) -> [f64; 4] {
        [
            normalize(t.accuracy, self.accuracy.0, self.accuracy.1),
            t.latency,
            t.cost,
            t.usage,
        ]
    }
}

fn squared_distance(a: [f64; 4], b: [f64; 4]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Return the point-cloud module nearest `target` under per-dimension
/// min-max normalization and Euclidean distance. Ties are broken by
/// insertion order — the earliest-inserted point standing, since the
/// cloud's `Vec` order is already the archive's insertion order and a tie
/// only ever replaces the incumbent on a *strictly* smaller distance.
///
/// Panics if `cloud` is empty; callers are expected to have already handled
/// the empty-cloud case (§4.5 step 3: "Empty cloud → `default-key`'s
/// module").
#[must_use]
pub fn nearest(cloud: &[(Phenotype, Module)], target: TargetPhenotype) -> Module {
    assert!(!cloud.is_empty(), "nearest called with an empty point-cloud");

    let ranges = Ranges::over(cloud);
    let target_norm = ranges.normalize_target(&target);

    let mut best: Option<(f64, &Module)> = None;
    for (phenotype, module) in cloud {
        let point_norm = ranges.normalize_point(phenotype);
        let d2 = squared_distance(point_norm, target_norm);
        let replace = match best {
            Some((best_d2, _)) => d2 < best_d2,
            None => true,
        };
        if replace {
            best = Some((d2, module));
        }
    }

    best.expect("non-empty cloud always yields a winner").1.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_types::{Field, Signature, Strategy};

    fn module(id: &str) -> Module {
        let sig = Signature::new("qa", vec![Field::new("q")], vec![Field::new("a")]).unwrap();
        Module::new(id, sig, Strategy::Predict, "x", vec![]).unwrap()
    }

    #[test]
    fn cheap_and_fast_priority_selects_the_cheap_fast_module() {
        let cloud = vec![
            (
                Phenotype::new(10.0, 500.0, 0.001, 100.0),
                module("expensive-accurate"),
            ),
            (
                Phenotype::new(5.0, 50.0, 0.0001, 20.0),
                module("cheap-fast"),
            ),
        ];
        let target = crate::keywords::keyword_target("cheap and fast").unwrap();
        let winner = nearest(&cloud, target);
        assert_eq!(winner.id, "cheap-fast");
    }

    #[test]
    fn zero_width_dimension_normalizes_to_half() {
        let cloud = vec![
            (Phenotype::new(10.0, 100.0, 0.1, 50.0), module("a")),
            (Phenotype::new(10.0, 200.0, 0.1, 60.0), module("b")),
        ];
        // Accuracy and cost are identical across the cloud; only latency
        // and usage vary. Should not panic or divide by zero.
        let winner = nearest(&cloud, TargetPhenotype::NEUTRAL);
        assert!(winner.id == "a" || winner.id == "b");
    }

    #[test]
    fn tie_breaks_to_earliest_inserted_point() {
        let cloud = vec![
            (Phenotype::new(5.0, 100.0, 0.1, 50.0), module("first")),
            (Phenotype::new(5.0, 100.0, 0.1, 50.0), module("second")),
        ];
        let winner = nearest(&cloud, TargetPhenotype::NEUTRAL);
        assert_eq!(winner.id, "first");
    }

    #[test]
    #[should_panic]
    fn empty_cloud_panics() {
        nearest(&[], TargetPhenotype::NEUTRAL);
    }
}
