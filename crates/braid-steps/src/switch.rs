use async_trait::async_trait;
use braid_step::{Batch, Context, Record, Step, StepError, Value};
use serde::Deserialize;

/// Routes records whose `field` equals `value` to `branch`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
  pub branch: String,
  pub field: String,
  pub value: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchConfig {
  #[serde(default)]
  pub conditions: Vec<Condition>,
}

/// Partitions records by the first matching condition.
///
/// Emits one record per branch that received anything, shaped
/// `{ <branch>: [records] }`, in condition order. Records matching no
/// condition are dropped.
#[derive(Debug, Clone)]
pub struct SwitchNode {
  conditions: Vec<Condition>,
}

impl SwitchNode {
  pub fn new(config: SwitchConfig) -> Self {
    Self {
      conditions: config.conditions,
    }
  }
}

#[async_trait]
impl Step for SwitchNode {
  async fn execute(&self, _ctx: &Context, input: Batch) -> Result<Batch, StepError> {
    let mut routed: Vec<Vec<Value>> = vec![Vec::new(); self.conditions.len()];

    for record in input {
      let matched = self
        .conditions
        .iter()
        .position(|cond| record.get(&cond.field) == Some(&cond.value));
      if let Some(i) = matched {
        routed[i].push(record.into_value());
      }
    }

    // Two conditions may name the same branch; they share one output record.
    let mut output: Vec<(String, Vec<Value>)> = Vec::new();
    for (cond, records) in self.conditions.iter().zip(routed) {
      if records.is_empty() {
        continue;
      }
      match output.iter_mut().find(|(branch, _)| *branch == cond.branch) {
        Some((_, existing)) => existing.extend(records),
        None => output.push((cond.branch.clone(), records)),
      }
    }

    Ok(
      output
        .into_iter()
        .map(|(branch, records)| Record::from_iter([(branch, Value::Array(records))]))
        .collect(),
    )
  }
}
