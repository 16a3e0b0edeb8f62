use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::step::StepDef;

/// A declarative workflow: steps, forward connections and error connections.
///
/// Forward connection lists are ordered; that order is the order in which
/// the engine delivers to and runs children.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDef {
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub start: Option<String>,
  #[serde(default)]
  pub steps: Vec<StepDef>,
  #[serde(default)]
  pub connections: BTreeMap<String, Vec<String>>,
  /// Failing step name -> error handler step name.
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub error_connections: BTreeMap<String, String>,
}

impl WorkflowDef {
  pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
    Ok(serde_yaml::from_str(content)?)
  }

  pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
    Ok(serde_json::from_str(content)?)
  }

  /// Load a definition from disk. `.json` files are parsed as JSON,
  /// anything else as YAML.
  pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;

    let is_json = path
      .extension()
      .and_then(|ext| ext.to_str())
      .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
      Self::from_json_str(&content)
    } else {
      Self::from_yaml_str(&content)
    }
  }

  pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
    Ok(serde_yaml::to_string(self)?)
  }

  /// Get a step declaration by name.
  pub fn step(&self, name: &str) -> Option<&StepDef> {
    self.steps.iter().find(|s| s.name == name)
  }

  /// Steps that are not the target of any forward or error connection, in
  /// declaration order.
  pub fn entry_points(&self) -> Vec<&str> {
    let targets: HashSet<&str> = self
      .connections
      .values()
      .flatten()
      .chain(self.error_connections.values())
      .map(String::as_str)
      .collect();

    self
      .steps
      .iter()
      .map(|s| s.name.as_str())
      .filter(|name| !targets.contains(name))
      .collect()
  }

  /// Pick the step a run starts from: an explicit override, then the
  /// definition's `start`, then the single entry point.
  pub fn start_step(&self, explicit: Option<&str>) -> Result<String, ConfigError> {
    if let Some(name) = explicit.or(self.start.as_deref()) {
      return Ok(name.to_string());
    }

    match self.entry_points().as_slice() {
      [only] => Ok(only.to_string()),
      [] => Err(ConfigError::NoStartStep {
        message: "every step has an incoming connection".to_string(),
      }),
      many => Err(ConfigError::NoStartStep {
        message: format!("multiple entry points: {}", many.join(", ")),
      }),
    }
  }
}
