//! Prompt rendering (§4.1).

use forge_types::{ContentBlock, Ctx, Example, Module, Prompt, Strategy};
use std::collections::BTreeMap;

const COT_HINT: &str = "Think step-by-step.";

/// Stringify a JSON value for a field line: strings are emitted raw,
/// everything else is compact JSON.
fn stringify_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Whether `value` is a URL with an image scheme or extension:
/// `data:image/*`, or ending `.png`/`.jpg`/`.jpeg` case-insensitive.
fn is_image_url(value: &serde_json::Value) -> Option<&str> {
    let s = value.as_str()?;
    let lower = s.to_ascii_lowercase();
    if lower.starts_with("data:image/")
        || lower.ends_with(".png")
        || lower.ends_with(".jpg")
        || lower.ends_with(".jpeg")
    {
        Some(s)
    } else {
        None
    }
}

/// Render field lines `"<name>: <stringified value>"` for each field in
/// `field_names` that has a binding in `values`, in `field_names`' order.
fn render_field_lines<'a>(
    field_names: impl Iterator<Item = &'a str>,
    values: &BTreeMap<String, serde_json::Value>,
) -> String {
    field_names
        .filter_map(|name| values.get(name).map(|v| format!("{name}: {}", stringify_value(v))))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_demo_block(module: &Module, demo: &Example) -> String {
    let lines = render_field_lines(module.signature.input_names(), &demo.inputs);
    let output_json = serde_json::to_string(&demo.expected).unwrap_or_default();
    format!("## Example\nInput:\n{lines}\nOutput:\n{output_json}")
}

fn render_task_block(module: &Module, inputs: &BTreeMap<String, serde_json::Value>) -> String {
    let lines = render_field_lines(module.signature.input_names(), inputs);
    let skeleton: BTreeMap<&str, &str> = module
        .signature
        .output_names()
        .map(|name| (name, "<?>"))
        .collect();
    let skeleton_json = serde_json::to_string(&skeleton).unwrap_or_default();
    format!("## Task\nInput:\n{lines}\nOutput (STRICT JSON):\n{skeleton_json}")
}

fn render_instructions(module: &Module) -> String {
    match module.strategy {
        Strategy::Predict => module.instructions.clone(),
        Strategy::ChainOfThought => format!("{}\n\n{COT_HINT}", module.instructions),
    }
}

/// Render the full prompt text: system preamble, memory block (if
/// non-empty), instructions, demo blocks, and the task block, in that
/// order, joined by blank lines.
fn render_text(module: &Module, ctx: &Ctx, inputs: &BTreeMap<String, serde_json::Value>) -> String {
    let mut sections = Vec::new();
    sections.push(ctx.system.clone());
    if !ctx.memory.is_empty() {
        sections.push(format!("## Memory\n{}", ctx.memory));
    }
    sections.push(render_instructions(module));
    for demo in &module.demos {
        sections.push(render_demo_block(module, demo));
    }
    sections.push(render_task_block(module, inputs));
    sections.join("\n\n")
}

/// Render a module's prompt for the given context and call-time input
/// bindings.
///
/// Produces a text-only prompt unless one of `inputs`' values (taken in
/// signature-declaration order) is an image URL, in which case the
/// rendered text is followed by an `ImageUrl` content block for the first
/// such value.
#[tracing::instrument(level = "debug", skip_all, fields(module.id = %module.id, signature = %module.signature.name))]
pub fn render_prompt(
    module: &Module,
    ctx: &Ctx,
    inputs: &BTreeMap<String, serde_json::Value>,
) -> Prompt {
    let text = render_text(module, ctx, inputs);

    let image_url = module
        .signature
        .input_names()
        .filter_map(|name| inputs.get(name))
        .find_map(is_image_url);

    match image_url {
        Some(url) => Prompt::Blocks(vec![
            ContentBlock::Text { text },
            ContentBlock::ImageUrl { url: url.to_string() },
        ]),
        None => Prompt::Text(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_types::{Field, Priority, Signature};
    use serde_json::json;

    fn sig() -> Signature {
        Signature::new(
            "qa",
            vec![Field::new("question")],
            vec![Field::new("answer")],
        )
        .unwrap()
    }

    fn module(strategy: Strategy) -> Module {
        Module::new("m1", sig(), strategy, "Answer the question.", vec![]).unwrap()
    }

    #[test]
    fn renders_system_instructions_and_task_block() {
        let ctx = Ctx::new("You are helpful.", Priority::Best);
        let inputs = BTreeMap::from([("question".to_string(), json!("2+2?"))]);
        let prompt = render_prompt(&module(Strategy::Predict), &ctx, &inputs);
        let text = prompt.text();
        assert!(text.starts_with("You are helpful."));
        assert!(text.contains("Answer the question."));
        assert!(text.contains("## Task"));
        assert!(text.contains("question: 2+2?"));
        assert!(text.contains("\"answer\":\"<?>\""));
    }

    #[test]
    fn memory_block_omitted_when_empty() {
        let ctx = Ctx::new("sys", Priority::Best);
        let inputs = BTreeMap::from([("question".to_string(), json!("x"))]);
        let text = render_prompt(&module(Strategy::Predict), &ctx, &inputs).text();
        assert!(!text.contains("## Memory"));
    }

    #[test]
    fn memory_block_included_when_present() {
        let mut ctx = Ctx::new("sys", Priority::Best);
        ctx.memory = "remember X".into();
        let inputs = BTreeMap::from([("question".to_string(), json!("x"))]);
        let text = render_prompt(&module(Strategy::Predict), &ctx, &inputs).text();
        assert!(text.contains("## Memory\nremember X"));
    }

    #[test]
    fn chain_of_thought_adds_hint() {
        let ctx = Ctx::new("sys", Priority::Best);
        let inputs = BTreeMap::from([("question".to_string(), json!("x"))]);
        let text = render_prompt(&module(Strategy::ChainOfThought), &ctx, &inputs).text();
        assert!(text.contains("Think step-by-step."));
    }

    #[test]
    fn demo_block_rendered_for_each_demo() {
        let demo = Example::new(
            BTreeMap::from([("question".to_string(), json!("1+1?"))]),
            BTreeMap::from([("answer".to_string(), json!("2"))]),
        );
        let m = Module::new("m1", sig(), Strategy::Predict, "Answer.", vec![demo]).unwrap();
        let ctx = Ctx::new("sys", Priority::Best);
        let inputs = BTreeMap::from([("question".to_string(), json!("2+2?"))]);
        let text = render_prompt(&m, &ctx, &inputs).text();
        assert!(text.contains("## Example"));
        assert!(text.contains("question: 1+1?"));
        assert!(text.contains("\"answer\":\"2\""));
    }

    #[test]
    fn image_url_input_emits_content_blocks() {
        let ctx = Ctx::new("sys", Priority::Best);
        let inputs = BTreeMap::from([(
            "question".to_string(),
            json!("https://example.com/photo.PNG"),
        )]);
        let prompt = render_prompt(&module(Strategy::Predict), &ctx, &inputs);
        match prompt {
            Prompt::Blocks(blocks) => {
                assert_eq!(blocks.len(), 2);
                assert!(matches!(&blocks[1], ContentBlock::ImageUrl { url } if url.ends_with("photo.PNG")));
            }
            Prompt::Text(_) => panic!("expected content blocks"),
        }
    }

    #[test]
    fn data_uri_image_detected() {
        let ctx = Ctx::new("sys", Priority::Best);
        let inputs = BTreeMap::from([(
            "question".to_string(),
            json!("data:image/png;base64,abcd"),
        )]);
        let prompt = render_prompt(&module(Strategy::Predict), &ctx, &inputs);
        assert!(matches!(prompt, Prompt::Blocks(_)));
    }

    #[test]
    fn non_image_text_input_stays_text_only() {
        let ctx = Ctx::new("sys", Priority::Best);
        let inputs = BTreeMap::from([("question".to_string(), json!("plain text"))]);
        let prompt = render_prompt(&module(Strategy::Predict), &ctx, &inputs);
        assert!(matches!(prompt, Prompt::Text(_)));
    }
}
