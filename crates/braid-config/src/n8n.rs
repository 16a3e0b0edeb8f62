//! Conversion of n8n flow exports into braid workflow definitions.
//!
//! Only the graph shape is carried over. n8n node parameters have no braid
//! equivalent, so every converted step gets the placeholder type
//! [`PLACEHOLDER_STEP_TYPE`] and must be edited before the flow does
//! anything useful.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use serde_json::Value;

use crate::error::ConfigError;
use crate::step::StepDef;
use crate::workflow::WorkflowDef;

/// Step type given to every converted step.
pub const PLACEHOLDER_STEP_TYPE: &str = "noOp";

#[derive(Deserialize)]
struct N8nFlow {
  #[serde(default)]
  name: Option<String>,
  #[serde(default)]
  nodes: Vec<N8nNode>,
  #[serde(default)]
  connections: BTreeMap<String, Value>,
}

#[derive(Deserialize)]
struct N8nNode {
  name: String,
}

/// Convert an n8n flow (JSON text) into a [`WorkflowDef`].
///
/// Connections may be keyed by output type (`{"main": [[{"node": "B"}]]}`,
/// as n8n exports them) or given directly as nested lists
/// (`[[{"node": "B"}]]`).
pub fn convert_n8n(content: &str) -> Result<WorkflowDef, ConfigError> {
  let flow: N8nFlow = serde_json::from_str(content)?;

  let mut names: BTreeSet<String> = flow.nodes.into_iter().map(|n| n.name).collect();
  let mut connections: BTreeMap<String, Vec<String>> = BTreeMap::new();

  for (from, outputs) in &flow.connections {
    names.insert(from.clone());
    for to in targets(outputs) {
      names.insert(to.clone());
      connections.entry(from.clone()).or_default().push(to);
    }
  }

  Ok(WorkflowDef {
    name: flow.name.unwrap_or_else(|| "converted".to_string()),
    start: None,
    steps: names
      .into_iter()
      .map(|name| StepDef::new(name, PLACEHOLDER_STEP_TYPE))
      .collect(),
    connections,
    error_connections: BTreeMap::new(),
  })
}

fn targets(outputs: &Value) -> Vec<String> {
  match outputs {
    Value::Object(by_type) => by_type.values().flat_map(targets).collect(),
    Value::Array(lists) => lists
      .iter()
      .filter_map(Value::as_array)
      .flatten()
      .filter_map(|conn| conn.get("node"))
      .map(|node| match node {
        Value::String(s) => s.clone(),
        other => other.to_string(),
      })
      .collect(),
    _ => Vec::new(),
  }
}
