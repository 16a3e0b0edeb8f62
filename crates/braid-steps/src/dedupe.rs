use std::collections::HashSet;

use async_trait::async_trait;
use braid_step::{Batch, Context, Step, StepError};
use serde::Deserialize;

use crate::group_key;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DedupeConfig {
  pub key: String,
}

/// Keeps the first record for each distinct value of `key`. Records that
/// lack the key are always kept.
#[derive(Debug, Clone)]
pub struct DedupeNode {
  key: String,
}

impl DedupeNode {
  pub fn new(config: DedupeConfig) -> Self {
    Self { key: config.key }
  }
}

#[async_trait]
impl Step for DedupeNode {
  async fn execute(&self, _ctx: &Context, input: Batch) -> Result<Batch, StepError> {
    let mut seen = HashSet::new();
    Ok(
      input
        .into_iter()
        .filter(|record| match group_key(record, &self.key) {
          Some(value) => seen.insert(value),
          None => true,
        })
        .collect(),
    )
  }
}
