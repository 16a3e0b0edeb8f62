use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read workflow file {path}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid YAML workflow definition: {0}")]
  Yaml(#[from] serde_yaml::Error),

  #[error("invalid JSON workflow definition: {0}")]
  Json(#[from] serde_json::Error),

  /// No start step given and none can be inferred.
  #[error("cannot determine start step: {message}")]
  NoStartStep { message: String },
}
