//! Integration tests for braid-engine running resolved workflow files with
//! the built-in steps.

use std::sync::Arc;

use braid_config::WorkflowDef;
use braid_engine::{Engine, EngineConfig, Outcome, RunError, RunResult};
use braid_resolver::{Resolver, StandardResolver};
use braid_step::{Batch, Context, StepError, Value};
use braid_telemetry::{Metrics, Registry};
use braid_workflow::Workflow;
use serde_json::json;

fn context() -> Context {
  let metrics = Metrics::register(&Registry::new()).expect("failed to register metrics");
  Context::new(Arc::new(metrics))
}

fn resolve(yaml: &str) -> Workflow {
  let def = WorkflowDef::from_yaml_str(yaml).expect("invalid workflow definition");
  let registry = braid_steps::builtin_registry().expect("failed to build registry");
  StandardResolver::new(registry)
    .resolve(&def)
    .expect("failed to resolve workflow")
}

fn batch(value: Value) -> Batch {
  serde_json::from_value(value).expect("not a batch")
}

async fn run(workflow: &Workflow, start: &str, input: Value) -> Result<RunResult, RunError> {
  Engine::new(EngineConfig::default())
    .run(&context(), workflow, start, batch(input))
    .await
}

#[tokio::test]
async fn test_contact_import_pipeline() {
  let workflow = resolve(
    r#"
name: contacts
steps:
  - name: trigger
    type: manualTrigger
    payload:
      - { email: a@x.io, tmp: 1 }
      - { email: b@x.io }
      - { email: a@x.io }
  - name: tag
    type: setNode
    setValues: { source: import }
    removeKeys: [tmp]
  - name: unique
    type: dedupeNode
    key: email
connections:
  trigger: [tag]
  tag: [unique]
"#,
  );

  let result = run(&workflow, "trigger", json!([])).await.unwrap();

  assert_eq!(result.executed(), vec!["trigger", "tag", "unique"]);
  assert_eq!(
    result.last_output("unique"),
    Some(&batch(json!([
      { "email": "a@x.io", "source": "import" },
      { "email": "b@x.io", "source": "import" }
    ])))
  );
}

#[tokio::test]
async fn test_failure_routed_to_error_handler() {
  let workflow = resolve(
    r#"
name: scheduled
steps:
  - { name: hook, type: webhookTrigger }
  - { name: hold, type: waitForNode, timestampKey: at }
  - { name: after, type: noOp }
  - { name: failures, type: errorHandlerNode }
connections:
  hook: [hold]
  hold: [after]
errorConnections:
  hold: failures
"#,
  );

  let result = run(&workflow, "hook", json!([{ "at": "soon" }]))
    .await
    .unwrap();

  assert_eq!(result.executed(), vec!["hook", "hold", "failures"]);
  assert!(result.outputs("after").is_empty());

  let routed: Vec<_> = result.routed().collect();
  assert_eq!(routed.len(), 1);
  assert!(matches!(
    &routed[0].outcome,
    Outcome::Routed { handler, .. } if handler == "failures"
  ));

  let handled = result.last_output("failures").unwrap();
  assert_eq!(handled.len(), 1);
  assert_eq!(handled[0].get("node"), Some(&json!("hold")));
  assert_eq!(
    handled[0].get("original_input"),
    Some(&json!([{ "at": "soon" }]))
  );
  assert!(
    handled[0]
      .get_str("error")
      .unwrap()
      .starts_with("failed to parse timestamp 'soon' for key 'at'")
  );
}

#[tokio::test]
async fn test_unhandled_failure_aborts_run() {
  let workflow = resolve(
    r#"
name: batches
steps:
  - { name: hook, type: webhookTrigger }
  - { name: split, type: splitInBatchesNode, batchSize: 0 }
  - { name: after, type: noOp }
connections:
  hook: [split]
  split: [after]
"#,
  );

  let ctx = context();
  let err = Engine::new(EngineConfig::default())
    .run(&ctx, &workflow, "hook", batch(json!([{ "id": 1 }])))
    .await
    .unwrap_err();

  assert_eq!(err.step(), Some("split"));
  assert!(matches!(
    err,
    RunError::StepFailed {
      source: StepError::InvalidConfig { .. },
      ..
    }
  ));
  assert_eq!(ctx.metrics().invocation_count("hook"), 1);
  assert_eq!(ctx.metrics().invocation_count("split"), 1);
  assert_eq!(ctx.metrics().error_count("split"), 1);
  assert_eq!(ctx.metrics().invocation_count("after"), 0);
}

#[tokio::test]
async fn test_switch_branches() {
  let workflow = resolve(
    r#"
name: tiers
steps:
  - { name: hook, type: webhookTrigger }
  - name: route
    type: switchNode
    conditions:
      - { branch: vip, field: tier, value: gold }
      - { branch: standard, field: tier, value: silver }
connections:
  hook: [route]
"#,
  );

  let result = run(
    &workflow,
    "hook",
    json!([
      { "tier": "silver", "id": 1 },
      { "tier": "gold", "id": 2 },
      { "tier": "bronze", "id": 3 }
    ]),
  )
  .await
  .unwrap();

  assert_eq!(
    result.last_output("route"),
    Some(&batch(json!([
      { "vip": [{ "tier": "gold", "id": 2 }] },
      { "standard": [{ "tier": "silver", "id": 1 }] }
    ])))
  );
}

#[tokio::test]
async fn test_cyclic_workflow_stops_at_limit() {
  let workflow = resolve(
    r#"
name: loop
steps:
  - { name: a, type: noOp }
  - { name: b, type: noOp }
connections:
  a: [b]
  b: [a]
"#,
  );

  let err = Engine::new(EngineConfig {
    max_invocations: Some(50),
  })
  .run(&context(), &workflow, "a", Vec::new())
  .await
  .unwrap_err();

  assert!(matches!(err, RunError::InvocationLimitExceeded { limit: 50 }));
}

#[tokio::test]
async fn test_concurrent_runs_share_metrics() {
  let workflow = Arc::new(resolve(
    r#"
name: tagging
steps:
  - { name: hook, type: webhookTrigger }
  - { name: tag, type: setNode, setValues: { seen: true } }
connections:
  hook: [tag]
"#,
  ));
  let engine = Arc::new(Engine::new(EngineConfig::default()));
  let ctx = context();

  let runs = (0..8).map(|i| {
    let engine = engine.clone();
    let workflow = workflow.clone();
    let ctx = ctx.clone();
    async move {
      engine
        .run(&ctx, &workflow, "hook", batch(json!([{ "id": i }])))
        .await
    }
  });
  let results = futures::future::join_all(runs).await;

  for (i, result) in results.into_iter().enumerate() {
    let result = result.unwrap();
    assert_eq!(
      result.last_output("tag"),
      Some(&batch(json!([{ "id": i, "seen": true }])))
    );
  }
  assert_eq!(ctx.metrics().invocation_count("hook"), 8);
  assert_eq!(ctx.metrics().invocation_count("tag"), 8);
  assert_eq!(ctx.metrics().error_count("tag"), 0);
}

#[tokio::test]
async fn test_run_result_serializes() {
  let workflow = resolve(
    r#"
name: tiny
steps:
  - { name: a, type: noOp }
"#,
  );

  let result = run(&workflow, "a", json!([{ "x": 1 }])).await.unwrap();
  let value = serde_json::to_value(&result).unwrap();

  assert_eq!(value["run_id"], json!(result.run_id));
  assert_eq!(value["invocations"][0]["step"], "a");
  assert_eq!(value["invocations"][0]["status"], "completed");
  assert_eq!(value["invocations"][0]["output"], json!([{ "x": 1 }]));
  assert!(value["invocations"][0]["elapsed_ms"].is_number());
}
