//! Archive persistence format (§6): `{task_type, archive, point_cloud,
//! default_id}`, stable on the wire and tolerant of unknown fields — new
//! optional fields can be added to any record without breaking old readers,
//! since `serde` ignores keys a struct doesn't declare and every optional
//! field here defaults on absence.

use forge_optimizer::ArchiveSnapshot;
use forge_types::{BinKey, CostBin, LatencyBin, Module, ModuleError, Phenotype, Signature, Strategy, UsageBin};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The `pattern` record for a module archive: `{id, signature, strategy,
/// instructions, demos, params}` (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternRecord {
    /// Module id.
    pub id: String,
    /// Signature the module targets.
    pub signature: Signature,
    /// Prompting strategy.
    pub strategy: Strategy,
    /// Instruction text.
    pub instructions: String,
    /// Few-shot demos, defaulting to none when absent.
    #[serde(default)]
    pub demos: Vec<forge_types::Example>,
    /// Free-form strategy/provider parameters.
    #[serde(default)]
    pub params: serde_json::Value,
}

impl From<&Module> for PatternRecord {
    fn from(m: &Module) -> Self {
        Self {
            id: m.id.clone(),
            signature: m.signature.clone(),
            strategy: m.strategy,
            instructions: m.instructions.clone(),
            demos: m.demos.clone(),
            params: m.params.clone(),
        }
    }
}

/// One bin's elite record: `{score, pattern}` (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveEntry {
    /// The bin's best-ever score.
    pub score: f64,
    /// The elite module.
    pub pattern: PatternRecord,
}

/// One point-cloud entry: `{phenotype, pattern}` (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointCloudEntry {
    /// Observed phenotype.
    pub phenotype: Phenotype,
    /// The module that produced it.
    pub pattern: PatternRecord,
}

/// The full archive persistence document (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveDocument {
    /// Task-type identifier.
    pub task_type: String,
    /// One entry per filled bin, keyed by the bin's string form (see
    /// [`bin_key_to_string`]).
    pub archive: HashMap<String, ArchiveEntry>,
    /// Every recorded `(phenotype, module)` pair.
    #[serde(default)]
    pub point_cloud: Vec<PointCloudEntry>,
    /// Id of the module backing the archive's globally-best bin, if any.
    pub default_id: Option<String>,
}

/// Errors decoding an [`ArchiveDocument`] back into an [`ArchiveSnapshot`].
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// A bin key string didn't parse to a recognized `cost-latency-usage`
    /// triple.
    #[error("unrecognized bin key: {0}")]
    UnknownBinKey(String),
    /// A pattern record's demos didn't conform to its own signature.
    #[error(transparent)]
    Module(#[from] ModuleError),
    /// `default_id` named a module id absent from both the archive and the
    /// point-cloud.
    #[error("default_id {0:?} does not match any decoded module")]
    DefaultIdNotFound(String),
}

/// Render `key` as its stable `cost-latency-usage` wire form, e.g.
/// `"cheap-fast-compact"`.
#[must_use]
pub fn bin_key_to_string(key: BinKey) -> String {
    let cost = match key.cost_bin {
        CostBin::Cheap => "cheap",
        CostBin::Premium => "premium",
    };
    let latency = match key.latency_bin {
        LatencyBin::Fast => "fast",
        LatencyBin::Slow => "slow",
    };
    let usage = match key.usage_bin {
        UsageBin::Compact => "compact",
        UsageBin::Verbose => "verbose",
    };
    format!("{cost}-{latency}-{usage}")
}

/// Parse a `cost-latency-usage` wire form back into a [`BinKey`].
fn bin_key_from_str(s: &str) -> Result<BinKey, ArchiveError> {
    let mut parts = s.split('-');
    let (cost, latency, usage) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(c), Some(l), Some(u), None) => (c, l, u),
        _ => return Err(ArchiveError::UnknownBinKey(s.to_string())),
    };
    let cost_bin = match cost {
        "cheap" => CostBin::Cheap,
        "premium" => CostBin::Premium,
        _ => return Err(ArchiveError::UnknownBinKey(s.to_string())),
    };
    let latency_bin = match latency {
        "fast" => LatencyBin::Fast,
        "slow" => LatencyBin::Slow,
        _ => return Err(ArchiveError::UnknownBinKey(s.to_string())),
    };
    let usage_bin = match usage {
        "compact" => UsageBin::Compact,
        "verbose" => UsageBin::Verbose,
        _ => return Err(ArchiveError::UnknownBinKey(s.to_string())),
    };
    Ok(BinKey {
        cost_bin,
        latency_bin,
        usage_bin,
    })
}

fn pattern_to_module(pattern: &PatternRecord) -> Result<Module, ArchiveError> {
    let mut module = Module::new(
        pattern.id.clone(),
        pattern.signature.clone(),
        pattern.strategy,
        pattern.instructions.clone(),
        pattern.demos.clone(),
    )?;
    module.params = pattern.params.clone();
    Ok(module)
}

/// Serialize `snapshot` into its wire document, tagged with `task_type`.
#[must_use]
pub fn to_document(snapshot: &ArchiveSnapshot, task_type: impl Into<String>) -> ArchiveDocument {
    let archive = snapshot
        .bins
        .iter()
        .map(|(key, (score, module))| {
            (
                bin_key_to_string(*key),
                ArchiveEntry {
                    score: *score,
                    pattern: PatternRecord::from(module),
                },
            )
        })
        .collect();

    let point_cloud = snapshot
        .point_cloud
        .iter()
        .map(|(phenotype, module)| PointCloudEntry {
            phenotype: *phenotype,
            pattern: PatternRecord::from(module),
        })
        .collect();

    let default_id = snapshot
        .default_key
        .and_then(|key| snapshot.bins.get(&key))
        .map(|(_, module)| module.id.clone());

    ArchiveDocument {
        task_type: task_type.into(),
        archive,
        point_cloud,
        default_id,
    }
}

/// Decode `doc` back into an [`ArchiveSnapshot`] for `signature`'s task.
///
/// A round-trip `snapshot -> document -> snapshot'` reproduces `bins` and
/// `default_key` exactly and `point_cloud` as a multiset (§8 testable
/// properties), since every field this module emits is read back verbatim.
pub fn from_document(doc: &ArchiveDocument, signature: Signature) -> Result<ArchiveSnapshot, ArchiveError> {
    let mut bins = HashMap::with_capacity(doc.archive.len());
    for (key_str, entry) in &doc.archive {
        let key = bin_key_from_str(key_str)?;
        let module = pattern_to_module(&entry.pattern)?;
        bins.insert(key, (entry.score, module));
    }

    let mut point_cloud = Vec::with_capacity(doc.point_cloud.len());
    for entry in &doc.point_cloud {
        let module = pattern_to_module(&entry.pattern)?;
        point_cloud.push((entry.phenotype, module));
    }

    let default_key = match &doc.default_id {
        None => None,
        Some(id) => {
            let found = bins
                .iter()
                .find(|(_, (_, m))| &m.id == id)
                .map(|(key, _)| *key);
            match found {
                Some(key) => Some(key),
                None => return Err(ArchiveError::DefaultIdNotFound(id.clone())),
            }
        }
    };

    Ok(ArchiveSnapshot {
        id: doc.task_type.clone(),
        signature,
        bins,
        point_cloud,
        default_key,
    })
}
