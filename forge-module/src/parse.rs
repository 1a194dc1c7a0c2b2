//! Strict-JSON response parsing (§4.1).

use forge_types::{Prompt, RunMeta, RunResult, Signature};
use std::collections::BTreeMap;

/// Parse assistant content as JSON and project it onto `signature`'s output
/// fields.
///
/// Returns `(ok, outputs)`. `ok` is true iff `raw` parses as a JSON object
/// and every required output field is present in it; missing optional
/// fields are filled with `null`. Parse failures (not valid JSON, or valid
/// JSON that isn't an object) yield `(false, {})` with no projection
/// attempted — this never raises (§4.1 failure semantics; §7
/// `ParseFailure`).
#[must_use]
pub fn parse_response(
    signature: &Signature,
    raw: &str,
) -> (bool, BTreeMap<String, serde_json::Value>) {
    let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(raw) else {
        return (false, BTreeMap::new());
    };

    let mut outputs = BTreeMap::new();
    let mut all_required_present = true;
    for field in &signature.outputs {
        match map.get(&field.name) {
            Some(value) => {
                outputs.insert(field.name.clone(), value.clone());
            }
            None => {
                outputs.insert(field.name.clone(), serde_json::Value::Null);
                if field.required {
                    all_required_present = false;
                }
            }
        }
    }

    (all_required_present, outputs)
}

/// Parse `raw` against `signature` and assemble the full [`RunResult`],
/// carrying the given `prompt` and `meta` through unchanged.
#[tracing::instrument(level = "debug", skip_all, fields(signature = %signature.name))]
#[must_use]
pub fn parse_response_into_result(
    signature: &Signature,
    raw: &str,
    prompt: Prompt,
    meta: RunMeta,
) -> RunResult {
    let (ok, outputs) = parse_response(signature, raw);
    RunResult {
        ok,
        outputs,
        raw: raw.to_string(),
        prompt,
        meta,
    }
}
