use std::collections::HashMap;

use async_trait::async_trait;
use braid_step::{Batch, Context, Record, Step, StepError};
use serde::Deserialize;

use crate::group_key;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeConfig {
  pub key: String,
}

/// Merge records sharing a key value. Groups come out in first-seen order;
/// within a group later records overwrite earlier fields. Records without
/// the key are returned separately, in input order.
fn merge_groups(input: Batch, key: &str) -> (Batch, Batch) {
  let mut merged: Vec<Record> = Vec::new();
  let mut index: HashMap<String, usize> = HashMap::new();
  let mut keyless = Vec::new();

  for record in input {
    match group_key(&record, key) {
      Some(value) => match index.get(&value) {
        Some(&i) => merged[i].merge(&record),
        None => {
          index.insert(value, merged.len());
          merged.push(record);
        }
      },
      None => keyless.push(record),
    }
  }

  (merged, keyless)
}

/// Merges records by key, then appends the records that lack the key.
#[derive(Debug, Clone)]
pub struct MergeNode {
  key: String,
}

impl MergeNode {
  pub fn new(config: MergeConfig) -> Self {
    Self { key: config.key }
  }
}

#[async_trait]
impl Step for MergeNode {
  async fn execute(&self, _ctx: &Context, input: Batch) -> Result<Batch, StepError> {
    let (mut merged, keyless) = merge_groups(input, &self.key);
    merged.extend(keyless);
    Ok(merged)
  }
}

/// Emits one merged record per key value. Records without the key are
/// dropped.
#[derive(Debug, Clone)]
pub struct MergeByKeyNode {
  key: String,
}

impl MergeByKeyNode {
  pub fn new(config: MergeConfig) -> Self {
    Self { key: config.key }
  }
}

#[async_trait]
impl Step for MergeByKeyNode {
  async fn execute(&self, _ctx: &Context, input: Batch) -> Result<Batch, StepError> {
    let (merged, _) = merge_groups(input, &self.key);
    Ok(merged)
  }
}
