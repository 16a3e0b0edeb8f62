use async_trait::async_trait;
use braid_step::{Batch, Context, Record, Step, StepError, Value};
use serde::Deserialize;
use serde_json::Map;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetConfig {
  #[serde(default)]
  pub set_values: Map<String, Value>,
  #[serde(default)]
  pub remove_keys: Vec<String>,
}

/// Sets and removes fields on every record. Removal runs after setting, so
/// a key in both lists ends up absent.
#[derive(Debug, Clone)]
pub struct SetNode {
  config: SetConfig,
}

impl SetNode {
  pub fn new(config: SetConfig) -> Self {
    Self { config }
  }

  fn apply(&self, mut record: Record) -> Record {
    for (key, value) in &self.config.set_values {
      record.insert(key.clone(), value.clone());
    }
    for key in &self.config.remove_keys {
      record.remove(key);
    }
    record
  }
}

#[async_trait]
impl Step for SetNode {
  async fn execute(&self, _ctx: &Context, input: Batch) -> Result<Batch, StepError> {
    Ok(input.into_iter().map(|record| self.apply(record)).collect())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_support::{batch, context};
  use serde_json::json;

  fn config(value: Value) -> SetConfig {
    serde_json::from_value(value).unwrap()
  }

  #[tokio::test]
  async fn test_set_and_remove() {
    let node = SetNode::new(config(json!({
      "setValues": { "status": "active", "count": 2 },
      "removeKeys": ["tmp"]
    })));

    let output = node
      .execute(
        &context(),
        batch(json!([
          { "id": 1, "tmp": "x" },
          { "id": 2, "status": "old" }
        ])),
      )
      .await
      .unwrap();

    assert_eq!(
      output,
      batch(json!([
        { "id": 1, "status": "active", "count": 2 },
        { "id": 2, "status": "active", "count": 2 }
      ]))
    );
  }

  #[tokio::test]
  async fn test_remove_wins_over_set() {
    let node = SetNode::new(config(json!({
      "setValues": { "flag": true },
      "removeKeys": ["flag"]
    })));

    let output = node
      .execute(&context(), batch(json!([{ "id": 1 }])))
      .await
      .unwrap();
    assert_eq!(output, batch(json!([{ "id": 1 }])));
  }

  #[tokio::test]
  async fn test_empty_config_is_identity() {
    let node = SetNode::new(SetConfig::default());
    let input = batch(json!([{ "id": 1 }]));

    assert_eq!(node.execute(&context(), input.clone()).await.unwrap(), input);
  }
}
