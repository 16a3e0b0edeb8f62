use braid_step::StepError;
use thiserror::Error;

/// Why a run ended without completing.
#[derive(Debug, Error)]
pub enum RunError {
  /// A step failed and has no error handler.
  #[error("step '{step}' failed: {source}")]
  StepFailed {
    step: String,
    #[source]
    source: StepError,
  },

  /// The walk reached a step the workflow does not contain.
  #[error("step not found: {step}")]
  UnknownStep { step: String },

  /// The run executed more steps than allowed. A cyclic graph without a
  /// terminating branch ends here.
  #[error("run exceeded the limit of {limit} step invocations")]
  InvocationLimitExceeded { limit: usize },
}

impl RunError {
  /// Name of the step the failure originated at, when there is one.
  pub fn step(&self) -> Option<&str> {
    match self {
      RunError::StepFailed { step, .. } | RunError::UnknownStep { step } => Some(step),
      RunError::InvocationLimitExceeded { .. } => None,
    }
  }
}
