use async_trait::async_trait;
use braid_step::{Batch, Context, Step, StepError};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualTriggerConfig {
  #[serde(default)]
  pub payload: Batch,
}

/// Seeds a flow with a fixed payload.
///
/// With no payload configured the trigger forwards whatever the run was
/// started with, so the same workflow can be fed from stdin.
#[derive(Debug, Clone)]
pub struct ManualTrigger {
  payload: Batch,
}

impl ManualTrigger {
  pub fn new(config: ManualTriggerConfig) -> Self {
    Self {
      payload: config.payload,
    }
  }
}

#[async_trait]
impl Step for ManualTrigger {
  async fn execute(&self, _ctx: &Context, input: Batch) -> Result<Batch, StepError> {
    if self.payload.is_empty() {
      return Ok(input);
    }
    Ok(self.payload.clone())
  }
}

/// The inbound webhook payload is the run's input; forward it as is.
#[derive(Debug, Default, Clone)]
pub struct WebhookTrigger;

#[async_trait]
impl Step for WebhookTrigger {
  async fn execute(&self, _ctx: &Context, input: Batch) -> Result<Batch, StepError> {
    Ok(input)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_support::{batch, context};
  use serde_json::json;

  #[tokio::test]
  async fn test_manual_trigger_emits_payload() {
    let trigger = ManualTrigger::new(ManualTriggerConfig {
      payload: batch(json!([{ "id": 1 }, { "id": 2 }])),
    });

    let output = trigger.execute(&context(), Vec::new()).await.unwrap();
    assert_eq!(output, batch(json!([{ "id": 1 }, { "id": 2 }])));
  }

  #[tokio::test]
  async fn test_manual_trigger_ignores_input_when_payload_set() {
    let trigger = ManualTrigger::new(ManualTriggerConfig {
      payload: batch(json!([{ "id": 1 }])),
    });

    let output = trigger
      .execute(&context(), batch(json!([{ "other": true }])))
      .await
      .unwrap();
    assert_eq!(output, batch(json!([{ "id": 1 }])));
  }

  #[tokio::test]
  async fn test_manual_trigger_without_payload_forwards_input() {
    let trigger = ManualTrigger::new(ManualTriggerConfig::default());

    let input = batch(json!([{ "from": "stdin" }]));
    let output = trigger.execute(&context(), input.clone()).await.unwrap();
    assert_eq!(output, input);
  }

  #[tokio::test]
  async fn test_webhook_trigger_forwards_input() {
    let input = batch(json!([{ "event": "signup" }]));
    let output = WebhookTrigger.execute(&context(), input.clone()).await.unwrap();
    assert_eq!(output, input);
  }
}
