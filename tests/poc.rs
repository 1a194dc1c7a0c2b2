//! Proof of concept: the full Chrysalis Forge pipeline wired end to end,
//! without a live upstream provider.
//!
//! 1. Evolve a seed module into a small `ModuleArchive` via a synchronous
//!    `Sender` test double (no network).
//! 2. Select an elite out of that archive for a natural-language priority.
//! 3. Render the elite's prompt for a fresh call.
//! 4. Drive a real streaming turn against a `wiremock` SSE stub using that
//!    rendered prompt, through the full reader/consumer/tool-dispatch
//!    engine.
//! 5. Round-trip the archive through its wire persistence format.

use forge::prelude::*;
use forge_optimizer::OptimizerError;
use forge_types::Prompt;
use std::collections::BTreeMap;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn qa_signature() -> Signature {
    Signature::new(
        "qa",
        vec![Field::new("question")],
        vec![Field::new("answer")],
    )
    .unwrap()
}

fn trainset() -> Vec<Example> {
    vec![
        Example::new(
            BTreeMap::from([("question".to_string(), serde_json::json!("1+1?"))]),
            BTreeMap::from([("answer".to_string(), serde_json::json!("2"))]),
        ),
        Example::new(
            BTreeMap::from([("question".to_string(), serde_json::json!("2+2?"))]),
            BTreeMap::from([("answer".to_string(), serde_json::json!("4"))]),
        ),
    ]
}

/// A `Sender` test double that always answers correctly with fixed
/// latency/token metadata, standing in for a real provider call during
/// evolution.
struct ScriptedSender;

impl forge_optimizer::Sender for ScriptedSender {
    fn send(
        &self,
        _prompt: &Prompt,
    ) -> Result<(bool, String, RunMeta), OptimizerError> {
        Ok((
            true,
            r#"{"answer":"4"}"#.to_string(),
            RunMeta {
                model: "mock-model".to_string(),
                prompt_tokens: 20,
                completion_tokens: 5,
                elapsed_ms: 120,
                finish_reason: "stop".to_string(),
            },
        ))
    }
}

struct EchoTool;
impl forge_tool::Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }
    fn description(&self) -> &str {
        "echoes its input back"
    }
    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({"type": "object"})
    }
    fn call(&self, args: serde_json::Value) -> Result<serde_json::Value, forge_types::ToolError> {
        Ok(args)
    }
}

#[tokio::test]
async fn evolve_select_render_and_run_a_turn() {
    // 1. Evolve a tiny archive from a seed module.
    let seed = Module::new("qa-seed", qa_signature(), Strategy::Predict, "Answer the question.", vec![]).unwrap();
    let ctx = Ctx::new("You are a terse arithmetic assistant.", Priority::Text("cheap and fast".into()));
    let price_table = PriceTable::new();
    let params = EvolutionParams {
        k_demos: 2,
        n_per_gen: 0,
        iterations: 0,
        use_meta: false,
        ..EvolutionParams::default()
    };

    let archive = forge_optimizer::evolve(&seed, &ctx, &trainset(), &ScriptedSender, params, &price_table, None)
        .expect("evolution should not raise on a well-formed trainset");
    let snapshot = archive.snapshot();
    assert!(!snapshot.is_empty());

    // 2. Select an elite for the context's priority.
    let elite = forge_selector::select(&snapshot, &ctx.priority, None).expect("non-empty archive always selects");

    // 3. Render a fresh prompt for that elite.
    let inputs = BTreeMap::from([("question".to_string(), serde_json::json!("3+3?"))]);
    let prompt = forge_module::render_prompt(&elite, &ctx, &inputs);
    let prompt_text = prompt.text();
    assert!(prompt_text.contains("## Task"));
    assert!(prompt_text.contains("question: 3+3?"));

    // 4. Drive a real streaming turn using that prompt against a stub SSE
    //    endpoint, including one tool call.
    let server = MockServer::start().await;
    let sse_body = concat!(
        "data: {\"choices\":[{\"delta\":{\"content\":\"The answer is \"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"id\":\"c1\",\"function\":{\"name\":\"echo\",\"arguments\":\"{\\\"n\\\":6}\"}}]}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"6.\"}}]}\n\n",
        "data: {\"usage\":{\"prompt_tokens\":12,\"completion_tokens\":4}}\n\n",
        "data: [DONE]\n\n",
    );
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(sse_body, "text/event-stream"))
        .mount(&server)
        .await;

    let mut registry = forge_tool::ToolRegistry::new();
    registry.register(std::sync::Arc::new(EchoTool));

    let client = reqwest::Client::new();
    let config = TurnConfig::default();
    let request = TurnRequest {
        api_key: "sk-test".to_string(),
        endpoint: format!("{}/chat", server.uri()),
        headers: vec![],
        payload: serde_json::json!({"model": "mock-model", "messages": [{"role": "user", "content": prompt_text}], "stream": true}),
        model: "mock-model".to_string(),
        timeout: std::time::Duration::from_secs(5),
    };

    let mut emitted = String::new();
    let mut tool_events = Vec::new();
    let outcome = forge_turn::run_turn(
        &client,
        request,
        &config,
        &registry,
        |chunk| emitted.push_str(chunk),
        |event| tool_events.push(event),
        || false,
    )
    .await
    .expect("stubbed turn should succeed");

    assert_eq!(emitted, "The answer is 6.");
    assert_eq!(outcome.assistant.content.as_deref(), Some("The answer is 6."));
    assert_eq!(outcome.assistant.tool_calls.len(), 1);
    assert_eq!(outcome.tool_results.len(), 1);
    assert_eq!(outcome.tool_results[0].content, r#"{"n":6}"#);
    assert_eq!(outcome.usage.prompt_tokens, 12);
    assert_eq!(tool_events.len(), 3);

    // 5. Round-trip the archive through its persistence format.
    let doc = to_document(&snapshot, "qa-task");
    let json = serde_json::to_string(&doc).unwrap();
    let decoded: ArchiveDocument = serde_json::from_str(&json).unwrap();
    let restored = from_document(&decoded, qa_signature()).unwrap();
    assert_eq!(restored.bins.len(), snapshot.bins.len());
    assert_eq!(restored.default_key, snapshot.default_key);
}
