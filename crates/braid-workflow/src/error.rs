use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
  #[error("step not found: {0}")]
  StepNotFound(String),

  #[error("duplicate step name: {0}")]
  DuplicateStep(String),

  #[error("connection references unknown step: from={from}, to={to}")]
  InvalidConnection { from: String, to: String },

  #[error("error connection references unknown step: step={step}, handler={handler}")]
  InvalidErrorConnection { step: String, handler: String },

  #[error("step '{step}' already has error handler '{existing}'")]
  DuplicateErrorHandler { step: String, existing: String },

  #[error("step '{0}' cannot be its own error handler")]
  SelfHandler(String),
}
