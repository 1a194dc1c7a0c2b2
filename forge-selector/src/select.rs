//! Top-level elite selection: priority → target phenotype → elite module
//! (§4.5).

use crate::keywords::keyword_target;
use crate::knn::nearest;
use crate::types::{PriorityClassifier, TargetPhenotype};
use forge_optimizer::ArchiveSnapshot;
use forge_types::{Module, Priority, SelectorError};

/// Symbolic tags the bin-shortcut (§4.5 step 2) recognizes, beyond the four
/// spellings `forge_types::Priority` itself parses — `compact`, `premium`,
/// and `slow` only ever appear as bin-key component names (§3 `BinKey`),
/// never as a parsed `Priority` variant, so they're matched here directly
/// off the priority's raw text rather than through the `Priority` enum.
const BIN_SHORTCUT_TAGS: [&str; 7] = ["cheap", "fast", "verbose", "compact", "premium", "slow", "best"];

/// If `priority`'s raw text is exactly one of the bin-shortcut tags, return
/// it; otherwise `None`. This is a full-string match, unlike the keyword
/// table's substring match in step 1.
fn symbolic_tag(priority: &Priority) -> Option<&'static str> {
    let lower = priority.as_str().trim().to_ascii_lowercase();
    BIN_SHORTCUT_TAGS.into_iter().find(|tag| lower == *tag)
}

/// Resolve `priority` to a [`TargetPhenotype`] (§4.5 step 1): the fixed
/// keyword table first, then `classifier` if no keyword matched, then the
/// neutral fallback — logged once, never guessed stronger (§9 "ambiguous
/// behavior").
fn target_phenotype(priority: &Priority, classifier: Option<&dyn PriorityClassifier>) -> TargetPhenotype {
    if let Some(target) = keyword_target(priority.as_str()) {
        return target;
    }

    if let Some(classifier) = classifier {
        match classifier.classify(priority.as_str()) {
            Ok(judgment) => return judgment.into_target(),
            Err(err) => {
                tracing::warn!(priority = %priority.as_str(), error = %err, "priority classifier failed; falling back to neutral target");
            }
        }
    } else {
        tracing::warn!(priority = %priority.as_str(), "no keyword matched and no priority classifier available; falling back to neutral target");
    }

    TargetPhenotype::NEUTRAL
}

/// Select the elite [`Module`] for `priority` out of `snapshot` (§4.5).
///
/// 1. If `priority` is exactly one of the symbolic bin-shortcut tags and a
///    bin whose key contains that tag exists, return its elite immediately.
/// 2. Otherwise resolve a target phenotype and dispatch via normalized
///    nearest-neighbor over the point-cloud.
/// 3. An empty point-cloud falls back to the archive's `default_key`'s
///    elite; an archive with neither bins nor point-cloud entries raises
///    [`SelectorError::ArchiveEmpty`].
///
/// Deterministic for a fixed `snapshot` and `priority` (§4.5
/// "Determinism"): no randomness anywhere in this path.
pub fn select(
    snapshot: &ArchiveSnapshot,
    priority: &Priority,
    classifier: Option<&dyn PriorityClassifier>,
) -> Result<Module, SelectorError> {
    if let Some(tag) = symbolic_tag(priority) {
        if let Some((_, module)) = snapshot.bins.iter().find_map(|(key, entry)| key.contains_tag(tag).then_some(entry)) {
            return Ok(module.clone());
        }
    }

    if snapshot.point_cloud.is_empty() {
        return snapshot
            .default_key
            .and_then(|key| snapshot.bins.get(&key))
            .map(|(_, module)| module.clone())
            .ok_or(SelectorError::ArchiveEmpty);
    }

    let target = target_phenotype(priority, classifier);
    Ok(nearest(&snapshot.point_cloud, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_optimizer::ModuleArchive;
    use forge_types::{BinKey, CostBin, Field, LatencyBin, Phenotype, Signature, Strategy, UsageBin};

    fn sig() -> Signature {
        Signature::new("qa", vec![Field::new("q")], vec![Field::new("a")]).unwrap()
    }

    fn module(id: &str) -> Module {
        Module::new(id, sig(), Strategy::Predict, "x", vec![]).unwrap()
    }

    #[test]
    fn empty_archive_raises_archive_empty() {
        let archive = ModuleArchive::new("t1", sig());
        let snap = archive.snapshot();
        let err = select(&snap, &Priority::Best, None).unwrap_err();
        assert_eq!(err, SelectorError::ArchiveEmpty);
    }

    #[test]
    fn empty_point_cloud_falls_back_to_default_key() {
        // Constructed archive always keeps point-cloud and bins in sync, so
        // this directly exercises the defensive branch rather than a
        // reachable archive state.
        let archive = ModuleArchive::new("t1", sig());
        let key = BinKey {
            cost_bin: CostBin::Cheap,
            latency_bin: LatencyBin::Fast,
            usage_bin: UsageBin::Compact,
        };
        archive.update(module("only"), 5.0, Phenotype::ZERO, key);
        let mut snap = archive.snapshot();
        snap.point_cloud.clear();
        let winner = select(&snap, &Priority::Best, None).unwrap();
        assert_eq!(winner.id, "only");
    }

    #[test]
    fn bin_shortcut_returns_matching_bin_without_knn() {
        let archive = ModuleArchive::new("t1", sig());
        let cheap_key = BinKey {
            cost_bin: CostBin::Cheap,
            latency_bin: LatencyBin::Slow,
            usage_bin: UsageBin::Verbose,
        };
        let premium_key = BinKey {
            cost_bin: CostBin::Premium,
            latency_bin: LatencyBin::Fast,
            usage_bin: UsageBin::Compact,
        };
        archive.update(module("cheap-elite"), 1.0, Phenotype::ZERO, cheap_key);
        archive.update(module("premium-elite"), 9.0, Phenotype::ZERO, premium_key);

        let snap = archive.snapshot();
        let winner = select(&snap, &Priority::Cheap, None).unwrap();
        assert_eq!(winner.id, "cheap-elite");
    }

    #[test]
    fn selection_is_deterministic_across_repeated_calls() {
        let archive = ModuleArchive::new("t1", sig());
        let key = BinKey {
            cost_bin: CostBin::Cheap,
            latency_bin: LatencyBin::Fast,
            usage_bin: UsageBin::Compact,
        };
        archive.update(module("m1"), 3.0, Phenotype::new(5.0, 100.0, 0.01, 50.0), key);
        archive.update(
            module("m2"),
            7.0,
            Phenotype::new(9.0, 900.0, 0.02, 90.0),
            key,
        );
        let snap = archive.snapshot();
        let priority = Priority::Text("be extremely thorough".into());
        let first = select(&snap, &priority, None).unwrap();
        let second = select(&snap, &priority, None).unwrap();
        assert_eq!(first.id, second.id);
    }

    #[test]
    fn natural_language_priority_without_keyword_uses_neutral_fallback() {
        let archive = ModuleArchive::new("t1", sig());
        let key = BinKey {
            cost_bin: CostBin::Cheap,
            latency_bin: LatencyBin::Fast,
            usage_bin: UsageBin::Compact,
        };
        archive.update(module("only"), 5.0, Phenotype::new(5.0, 100.0, 0.01, 50.0), key);
        let snap = archive.snapshot();
        // No keyword in this text and no classifier supplied: falls back to
        // TargetPhenotype::NEUTRAL rather than raising or guessing.
        let winner = select(&snap, &Priority::Text("surprise me".into()), None).unwrap();
        assert_eq!(winner.id, "only");
    }
}
