//! Priority → target-phenotype keyword table (§4.5 step 1).

use crate::types::TargetPhenotype;

/// Fixed keyword groups, in table order, each mapping to its target
/// phenotype. Order matters only as a tie-break when two keywords from
/// different groups start at the same index in the input text; the match
/// itself is decided by whichever keyword occurs *earliest* in the text,
/// not by table order (see [`keyword_target`]'s doc comment — confirmed by
/// the "cheap and fast" seed scenario, where `cheap` wins because it occurs
/// first even though `fast` is listed earlier in the spec's own table).
const KEYWORD_GROUPS: &[(&[&str], TargetPhenotype)] = &[
    (
        &["fast", "quick"],
        TargetPhenotype {
            accuracy: 5.0,
            latency: 0.0,
            cost: 0.5,
            usage: 0.5,
        },
    ),
    (
        &["cheap", "budget"],
        TargetPhenotype {
            accuracy: 5.0,
            latency: 0.5,
            cost: 0.0,
            usage: 0.5,
        },
    ),
    (
        &["accurate", "best", "precise"],
        TargetPhenotype {
            accuracy: 10.0,
            latency: 0.5,
            cost: 0.5,
            usage: 0.5,
        },
    ),
    (
        &["concise", "compact"],
        TargetPhenotype {
            accuracy: 5.0,
            latency: 0.5,
            cost: 0.5,
            usage: 0.0,
        },
    ),
    (
        &["verbose", "thorough"],
        TargetPhenotype {
            accuracy: 10.0,
            latency: 0.8,
            cost: 0.8,
            usage: 1.0,
        },
    ),
];

/// Resolve `text` against the fixed keyword table (case-insensitive
/// substring match, §4.5 step 1).
///
/// When more than one keyword appears in `text`, the one occurring at the
/// *earliest* byte offset wins (ties broken by table order above), not the
/// first group listed — this matches the worked example where `"cheap and
/// fast"` resolves via `cheap`, not `fast`, because `cheap` starts at
/// offset `0`.
#[must_use]
pub fn keyword_target(text: &str) -> Option<TargetPhenotype> {
    let lower = text.to_ascii_lowercase();
    let mut best: Option<(usize, TargetPhenotype)> = None;

    for (words, target) in KEYWORD_GROUPS {
        for word in *words {
            if let Some(idx) = lower.find(word) {
                let replace = match best {
                    Some((best_idx, _)) => idx < best_idx,
                    None => true,
                };
                if replace {
                    best = Some((idx, *target));
                }
            }
        }
    }

    best.map(|(_, target)| target)
}
