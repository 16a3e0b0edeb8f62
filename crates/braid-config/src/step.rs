use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A step declaration: its unique name, its type tag and the remaining
/// keys as an opaque configuration block for the step's factory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDef {
  pub name: String,
  /// Type tag looked up in the step registry, e.g. "setNode".
  #[serde(rename = "type")]
  pub step_type: String,
  #[serde(flatten)]
  pub config: Map<String, Value>,
}

impl StepDef {
  /// A declaration with an empty configuration block.
  pub fn new(name: impl Into<String>, step_type: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      step_type: step_type.into(),
      config: Map::new(),
    }
  }

  /// Add one configuration key.
  pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
    self.config.insert(key.into(), value);
    self
  }

  /// The configuration block as a single JSON object.
  pub fn config_value(&self) -> Value {
    Value::Object(self.config.clone())
  }
}
