use async_trait::async_trait;
use braid_step::{Batch, Context, Record, Step, StepError, Value};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitConfig {
  pub batch_size: usize,
}

/// Chunks the input into records of the form `{"batch": [..]}`, each
/// holding at most `batchSize` of the original records in order.
#[derive(Debug, Clone)]
pub struct SplitInBatches {
  batch_size: usize,
}

impl SplitInBatches {
  pub fn new(config: SplitConfig) -> Self {
    Self {
      batch_size: config.batch_size,
    }
  }
}

#[async_trait]
impl Step for SplitInBatches {
  async fn execute(&self, _ctx: &Context, input: Batch) -> Result<Batch, StepError> {
    if self.batch_size == 0 {
      return Err(StepError::invalid_config("batch size must be greater than 0"));
    }

    Ok(
      input
        .chunks(self.batch_size)
        .map(|chunk| {
          let items = chunk.iter().cloned().map(Value::from).collect();
          Record::from_iter([("batch", Value::Array(items))])
        })
        .collect(),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_support::{batch, context};
  use serde_json::json;

  fn node(batch_size: usize) -> SplitInBatches {
    SplitInBatches::new(SplitConfig { batch_size })
  }

  #[tokio::test]
  async fn test_split_with_remainder() {
    let output = node(2)
      .execute(
        &context(),
        batch(json!([{ "n": 1 }, { "n": 2 }, { "n": 3 }, { "n": 4 }, { "n": 5 }])),
      )
      .await
      .unwrap();

    assert_eq!(
      output,
      batch(json!([
        { "batch": [{ "n": 1 }, { "n": 2 }] },
        { "batch": [{ "n": 3 }, { "n": 4 }] },
        { "batch": [{ "n": 5 }] }
      ]))
    );
  }

  #[tokio::test]
  async fn test_split_empty_input() {
    let output = node(3).execute(&context(), Vec::new()).await.unwrap();
    assert!(output.is_empty());
  }

  #[tokio::test]
  async fn test_zero_batch_size_fails() {
    let err = node(0)
      .execute(&context(), batch(json!([{ "n": 1 }])))
      .await
      .unwrap_err();
    assert!(matches!(err, StepError::InvalidConfig { .. }));
  }
}
