//! `ModuleArchive`: the MAP-Elites bin archive plus continuous point-cloud
//! (§3, §4.3).
//!
//! Mutations are serialized through a `Mutex`-guarded body, matching the
//! "single writer to the archive" concurrency invariant (§5): a short
//! critical section per update, and readers clone a consistent snapshot out
//! from behind the lock before using it across an await point or any
//! longer-lived borrow, the same shape as the donor workspace's
//! lock-then-clone-then-release pattern in `neuron-loop`.

use forge_types::{BinKey, Module, Phenotype, Signature};
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::sync::Mutex;

/// An immutable point-in-time view of an archive's contents, safe to hold
/// and pass around without the lock.
#[derive(Debug, Clone)]
pub struct ArchiveSnapshot {
    /// Task-type identifier this archive was built for.
    pub id: String,
    /// Signature every module in this archive targets.
    pub signature: Signature,
    /// One elite per discrete bin, with its best-ever score.
    pub bins: HashMap<BinKey, (f64, Module)>,
    /// Every `(phenotype, module)` pair recorded, for k-NN dispatch.
    pub point_cloud: Vec<(Phenotype, Module)>,
    /// The bin with the globally highest score, ties broken by insertion
    /// order (`None` only when the archive has never had an update).
    pub default_key: Option<BinKey>,
}

impl ArchiveSnapshot {
    /// Whether this snapshot has no elites and no point-cloud entries
    /// (§7 `ArchiveEmpty`).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty() && self.point_cloud.is_empty()
    }
}

struct ArchiveState {
    bins: HashMap<BinKey, (f64, Module)>,
    point_cloud: Vec<(Phenotype, Module)>,
    default_key: Option<BinKey>,
}

/// A MAP-Elites archive: one elite `Module` per [`BinKey`], plus a
/// continuous point-cloud used for nearest-neighbor dispatch (§3).
pub struct ModuleArchive {
    id: String,
    signature: Signature,
    inner: Mutex<ArchiveState>,
}

impl ModuleArchive {
    /// Construct an empty archive for `signature`, tagged with `id`.
    #[must_use]
    pub fn new(id: impl Into<String>, signature: Signature) -> Self {
        Self {
            id: id.into(),
            signature,
            inner: Mutex::new(ArchiveState {
                bins: HashMap::new(),
                point_cloud: Vec::new(),
                default_key: None,
            }),
        }
    }

    /// `update_archive!(mod, score, key)` (§4.3): insert `module` into
    /// `key`'s bin if the bin is empty or `score` strictly improves on the
    /// incumbent (ties go to the incumbent); always append `(phenotype,
    /// module)` to the point-cloud; update `default_key` if this score is
    /// the new global maximum.
    pub fn update(&self, module: Module, score: f64, phenotype: Phenotype, key: BinKey) {
        let mut state = self.inner.lock().expect("archive mutex poisoned");

        let improves = match state.bins.get(&key) {
            Some((existing_score, _)) => score > *existing_score,
            None => true,
        };
        if improves {
            state.bins.insert(key, (score, module.clone()));
        }

        let is_new_global_best = match state.default_key {
            Some(current) => match state.bins.get(&current) {
                Some((current_score, _)) => score > *current_score,
                None => true,
            },
            None => true,
        };
        if improves && is_new_global_best {
            state.default_key = Some(key);
        }

        state.point_cloud.push((phenotype, module));
    }

    /// Take a consistent, lock-free snapshot of this archive's current
    /// contents.
    #[must_use]
    pub fn snapshot(&self) -> ArchiveSnapshot {
        let state = self.inner.lock().expect("archive mutex poisoned");
        ArchiveSnapshot {
            id: self.id.clone(),
            signature: self.signature.clone(),
            bins: state.bins.clone(),
            point_cloud: state.point_cloud.clone(),
            default_key: state.default_key,
        }
    }

    /// Prune the point-cloud to at most `max_cloud_size` entries: every
    /// entry that currently backs a bin is kept unconditionally, then the
    /// remainder is sampled uniformly without replacement up to the cap
    /// (§4.3 "Point-cloud pruning").
    pub fn prune(&self, max_cloud_size: usize) {
        let mut state = self.inner.lock().expect("archive mutex poisoned");
        if state.point_cloud.len() <= max_cloud_size {
            return;
        }

        let backing_modules: std::collections::HashSet<String> =
            state.bins.values().map(|(_, m)| m.id.clone()).collect();

        let (backing, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut state.point_cloud)
            .into_iter()
            .partition(|(_, m)| backing_modules.contains(&m.id));

        let remaining_capacity = max_cloud_size.saturating_sub(backing.len());
        let mut rng = rand::rng();
        let mut sampled: Vec<_> = rest;
        sampled.shuffle(&mut rng);
        sampled.truncate(remaining_capacity);

        let mut pruned = backing;
        pruned.extend(sampled);
        state.point_cloud = pruned;
    }

    /// Signature every module in this archive targets.
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Task-type identifier this archive was built for.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}
