use braid_step::StepError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
  #[error("step type already registered: {0}")]
  DuplicateType(String),

  #[error("unknown step type '{step_type}' for step '{step}'")]
  UnknownType { step: String, step_type: String },

  #[error("invalid configuration for step '{step}': {source}")]
  InvalidConfig {
    step: String,
    #[source]
    source: StepError,
  },
}
