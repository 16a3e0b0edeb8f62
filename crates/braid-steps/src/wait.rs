use std::time::Duration;

use async_trait::async_trait;
use braid_step::{Batch, Context, Step, StepError};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Deserialize;
use tracing::debug;

/// Sleep for `duration`, or return `Cancelled` as soon as the context is
/// cancelled.
async fn sleep_or_cancel(ctx: &Context, duration: Duration) -> Result<(), StepError> {
  tokio::select! {
    biased;
    _ = ctx.cancellation().cancelled() => Err(StepError::Cancelled),
    _ = tokio::time::sleep(duration) => Ok(()),
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitConfig {
  #[serde(default)]
  pub max_seconds: u64,
}

/// Pauses for a random duration in `[0, maxSeconds)` seconds, then passes
/// its input through.
#[derive(Debug, Clone)]
pub struct WaitNode {
  max: Duration,
}

impl WaitNode {
  pub fn new(config: WaitConfig) -> Self {
    Self {
      max: Duration::from_secs(config.max_seconds),
    }
  }
}

#[async_trait]
impl Step for WaitNode {
  async fn execute(&self, ctx: &Context, input: Batch) -> Result<Batch, StepError> {
    let max_ms = self.max.as_millis() as u64;
    if max_ms == 0 {
      return Ok(input);
    }

    let delay = Duration::from_millis(rand::thread_rng().gen_range(0..max_ms));
    debug!(delay_ms = delay.as_millis() as u64, "wait_started");
    sleep_or_cancel(ctx, delay).await?;
    Ok(input)
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitForConfig {
  pub timestamp_key: String,
}

/// Holds each record until the RFC 3339 timestamp stored under
/// `timestampKey`. Timestamps in the past do not wait.
#[derive(Debug, Clone)]
pub struct WaitForNode {
  timestamp_key: String,
}

impl WaitForNode {
  pub fn new(config: WaitForConfig) -> Self {
    Self {
      timestamp_key: config.timestamp_key,
    }
  }

  fn deadline(&self, raw: &str) -> Result<DateTime<Utc>, StepError> {
    DateTime::parse_from_rfc3339(raw)
      .map(|t| t.with_timezone(&Utc))
      .map_err(|e| {
        StepError::failed(format!(
          "failed to parse timestamp '{}' for key '{}': {}",
          raw, self.timestamp_key, e
        ))
      })
  }
}

#[async_trait]
impl Step for WaitForNode {
  async fn execute(&self, ctx: &Context, input: Batch) -> Result<Batch, StepError> {
    for record in &input {
      let deadline = self.deadline(record.get_str(&self.timestamp_key)?)?;

      // negative means the deadline already passed
      if let Ok(remaining) = (deadline - Utc::now()).to_std() {
        debug!(until = %deadline, "wait_for_started");
        sleep_or_cancel(ctx, remaining).await?;
      }
    }
    Ok(input)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_support::{batch, context};
  use braid_step::RecordError;
  use serde_json::json;

  fn wait_for() -> WaitForNode {
    WaitForNode::new(WaitForConfig {
      timestamp_key: "at".to_string(),
    })
  }

  #[tokio::test]
  async fn test_wait_zero_passes_through() {
    let node = WaitNode::new(WaitConfig { max_seconds: 0 });
    let input = batch(json!([{ "id": 1 }]));

    assert_eq!(node.execute(&context(), input.clone()).await.unwrap(), input);
  }

  #[tokio::test(start_paused = true)]
  async fn test_wait_sleeps_less_than_max() {
    let node = WaitNode::new(WaitConfig { max_seconds: 5 });
    let started = tokio::time::Instant::now();

    let output = node
      .execute(&context(), batch(json!([{ "id": 1 }])))
      .await
      .unwrap();

    assert_eq!(output.len(), 1);
    assert!(started.elapsed() < Duration::from_secs(5));
  }

  #[tokio::test(start_paused = true)]
  async fn test_wait_observes_cancellation() {
    let node = WaitNode::new(WaitConfig { max_seconds: 3600 });
    let ctx = context();
    ctx.cancellation().cancel();

    let err = node
      .execute(&ctx, batch(json!([{ "id": 1 }])))
      .await
      .unwrap_err();
    assert!(matches!(err, StepError::Cancelled));
  }

  #[tokio::test]
  async fn test_wait_for_past_timestamp_returns_immediately() {
    let input = batch(json!([{ "at": "2001-02-03T04:05:06Z", "id": 1 }]));
    let output = wait_for().execute(&context(), input.clone()).await.unwrap();
    assert_eq!(output, input);
  }

  #[tokio::test(start_paused = true)]
  async fn test_wait_for_future_timestamp_is_cancellable() {
    let ctx = context();
    ctx.cancellation().cancel();

    let at = (Utc::now() + chrono::Duration::hours(1)).to_rfc3339();
    let err = wait_for()
      .execute(&ctx, batch(json!([{ "at": at }])))
      .await
      .unwrap_err();
    assert!(matches!(err, StepError::Cancelled));
  }

  #[tokio::test]
  async fn test_wait_for_missing_key() {
    let err = wait_for()
      .execute(&context(), batch(json!([{ "id": 1 }])))
      .await
      .unwrap_err();
    assert!(matches!(
      err,
      StepError::Record(RecordError::MissingField { .. })
    ));
  }

  #[tokio::test]
  async fn test_wait_for_non_string_timestamp() {
    let err = wait_for()
      .execute(&context(), batch(json!([{ "at": 12 }])))
      .await
      .unwrap_err();
    assert!(matches!(
      err,
      StepError::Record(RecordError::TypeMismatch { .. })
    ));
  }

  #[tokio::test]
  async fn test_wait_for_unparsable_timestamp() {
    let err = wait_for()
      .execute(&context(), batch(json!([{ "at": "tomorrow" }])))
      .await
      .unwrap_err();
    assert!(err.to_string().contains("failed to parse timestamp 'tomorrow'"));
  }
}
