use braid_record::RecordError;
use thiserror::Error;

/// A step invocation failure.
///
/// The engine treats every variant the same way: it counts it, logs it and
/// either routes it to an error handler or aborts the run.
#[derive(Debug, Error)]
pub enum StepError {
  /// Generic failure reported by a step.
  #[error("{message}")]
  Failed { message: String },

  /// Input data did not have the expected shape.
  #[error(transparent)]
  Record(#[from] RecordError),

  /// The step was configured with values it cannot work with.
  #[error("invalid step configuration: {message}")]
  InvalidConfig { message: String },

  /// Outbound HTTP call failed.
  #[error("http request failed: {0}")]
  Http(#[from] reqwest::Error),

  /// The step observed cancellation and stopped early.
  #[error("step cancelled")]
  Cancelled,
}

impl StepError {
  pub fn failed(message: impl Into<String>) -> Self {
    Self::Failed {
      message: message.into(),
    }
  }

  pub fn invalid_config(message: impl Into<String>) -> Self {
    Self::InvalidConfig {
      message: message.into(),
    }
  }
}
