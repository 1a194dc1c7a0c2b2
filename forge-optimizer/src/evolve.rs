//! The MAP-Elites evolution loop (§4.3).

use crate::archive::ModuleArchive;
use crate::phenotype::{bin_of, phenotype_of, thresholds_from_metas};
use crate::types::{EvolutionParams, MetaOptimizer, Sender};
use forge_scorer::PriceTable;
use forge_types::{BinKey, Ctx, Example, Module, OptimizerError, RunMeta, Signature, Thresholds};
use rand::seq::SliceRandom;

const SEED_MUTATIONS: [Option<&str>; 4] = [
    None,
    Some("Be concise."),
    Some("Think step-by-step."),
    Some("Output STRICT JSON."),
];

/// Validate that every trainset example supplies every required input
/// field of `signature`. A malformed trainset is fatal (§4.3 failure
/// policy), unlike a single bad candidate evaluation.
pub fn validate_trainset(signature: &Signature, trainset: &[Example]) -> Result<(), OptimizerError> {
    for (index, example) in trainset.iter().enumerate() {
        let missing: Vec<String> = signature
            .inputs
            .iter()
            .filter(|f| f.required && !example.inputs.contains_key(&f.name))
            .map(|f| f.name.clone())
            .collect();
        if !missing.is_empty() {
            return Err(OptimizerError::TrainsetMismatch { index, missing });
        }
    }
    Ok(())
}

/// Sample `min(k, |trainset|)` examples uniformly without replacement
/// (§4.3 step 1).
fn bootstrap_demos(trainset: &[Example], k: usize) -> Vec<Example> {
    let k = k.min(trainset.len());
    let mut rng = rand::rng();
    trainset.choose_multiple(&mut rng, k).cloned().collect()
}

/// The four fixed seed instruction mutations (§4.3 step 2): identity, plus
/// three fixed suffixes appended to the base instructions.
fn seed_mutations(base: &Module) -> Vec<Module> {
    SEED_MUTATIONS
        .iter()
        .enumerate()
        .map(|(i, suffix)| {
            let instructions = match suffix {
                Some(s) => format!("{} {s}", base.instructions),
                None => base.instructions.clone(),
            };
            base.with_instructions(instructions).with_id(format!("{}-seed{i}", base.id))
        })
        .collect()
}

/// Evaluate `module` against every example in `trainset`, aggregating
/// token/latency metadata across calls and checking whether every parsed
/// output matches its expected binding.
///
/// Returns `None` when any call raises (the evaluation-level failure in
/// the §4.3 failure policy); the caller scores that as `0.1` with a zero
/// phenotype rather than propagating.
fn evaluate_module(module: &Module, ctx: &Ctx, trainset: &[Example], sender: &dyn Sender) -> Option<(RunMeta, bool)> {
    let mut agg = RunMeta::default();
    let mut all_match = true;

    for example in trainset {
        let prompt = forge_module::render_prompt(module, ctx, &example.inputs);
        let (_ok, raw, meta) = sender.send(&prompt).ok()?;
        let (parsed_ok, outputs) = forge_module::parse_response(&module.signature, &raw);
        if !parsed_ok || outputs != example.expected {
            all_match = false;
        }
        agg.prompt_tokens += meta.prompt_tokens;
        agg.completion_tokens += meta.completion_tokens;
        agg.elapsed_ms += meta.elapsed_ms;
        agg.model = meta.model;
        agg.finish_reason = meta.finish_reason;
    }

    Some((agg, all_match))
}

fn record_evaluation(
    archive: &ModuleArchive,
    module: Module,
    result: Option<(RunMeta, bool)>,
    thresholds: &Thresholds,
    table: &PriceTable,
) {
    match result {
        Some((meta, accuracy_match)) => {
            let key = bin_of(&meta, table, thresholds);
            let score = forge_scorer::score_meta(accuracy_match, &meta, table);
            let accuracy_value = if accuracy_match { 10.0 } else { 0.0 };
            let phenotype = phenotype_of(&meta, table, accuracy_value);
            archive.update(module, score, phenotype, key);
        }
        None => {
            tracing::warn!(module = %module.id, "candidate evaluation failed; scoring floor with zero phenotype");
            let key = bin_of(&RunMeta::default(), table, thresholds);
            archive.update(module, 0.1, forge_types::Phenotype::ZERO, key);
        }
    }
}

/// Sample a parent bin to generate children from. With probability
/// `exploration_rate` a uniformly random bin is picked; otherwise the
/// globally best-scoring bin (`snapshot.default_key`) is favored (§6
/// `EXPLORATION_RATE`).
fn sample_parent(archive: &ModuleArchive, exploration_rate: f64) -> Option<Module> {
    let snap = archive.snapshot();
    if snap.bins.is_empty() {
        return None;
    }
    let mut rng = rand::rng();
    let explore = rand::Rng::random::<f64>(&mut rng) < exploration_rate;
    if !explore {
        if let Some(key) = &snap.default_key {
            if let Some((_, module)) = snap.bins.get(key) {
                return Some(module.clone());
            }
        }
    }
    let keys: Vec<&BinKey> = snap.bins.keys().collect();
    let key = *keys.choose(&mut rng)?;
    snap.bins.get(key).map(|(_, m)| m.clone())
}

/// Run the full MAP-Elites optimization described in §4.3: bootstrap demos
/// onto `seed`, fan out the four fixed instruction mutations, derive
/// relative thresholds from their evaluations, seed the archive, then
/// optionally run `params.iterations` generations of meta-optimizer-driven
/// evolution.
pub fn evolve(
    seed: &Module,
    ctx: &Ctx,
    trainset: &[Example],
    sender: &dyn Sender,
    params: EvolutionParams,
    price_table: &PriceTable,
    meta_optimizer: Option<&dyn MetaOptimizer>,
) -> Result<ModuleArchive, OptimizerError> {
    validate_trainset(&seed.signature, trainset)?;

    let demos = bootstrap_demos(trainset, params.k_demos);
    let base = seed.with_demos(demos);
    let mutations = seed_mutations(&base);

    let mut evaluations = Vec::with_capacity(mutations.len());
    let mut seed_metas = Vec::new();
    for module in mutations {
        let result = evaluate_module(&module, ctx, trainset, sender);
        if let Some((meta, _)) = &result {
            seed_metas.push(meta.clone());
        }
        evaluations.push((module, result));
    }

    let thresholds = if seed_metas.is_empty() {
        Thresholds::default()
    } else {
        thresholds_from_metas(&seed_metas, price_table)
    };

    let archive = ModuleArchive::new(seed.id.clone(), seed.signature.clone());
    for (module, result) in evaluations {
        record_evaluation(&archive, module, result, &thresholds, price_table);
    }
    archive.prune(params.max_cloud_size);

    if params.use_meta {
        if let Some(meta_opt) = meta_optimizer {
            for _generation in 0..params.iterations {
                let Some(parent) = sample_parent(&archive, params.exploration_rate) else {
                    break;
                };
                for _ in 0..params.n_per_gen {
                    match meta_opt.generate_variant(&parent, trainset) {
                        Ok((child, explanation)) => {
                            tracing::debug!(
                                parent = %parent.id,
                                child = %child.id,
                                explanation = %explanation,
                                "meta-optimizer proposed variant"
                            );
                            let result = evaluate_module(&child, ctx, trainset, sender);
                            record_evaluation(&archive, child, result, &thresholds, price_table);
                        }
                        Err(err) => {
                            tracing::warn!(parent = %parent.id, error = %err, "meta-optimizer failed to generate a variant");
                        }
                    }
                }
                archive.prune(params.max_cloud_size);
            }
        }
    }

    Ok(archive)
}
