use std::time::Duration;

use braid_step::Batch;
use serde::{Serialize, Serializer};

/// What one step invocation produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
  /// The step succeeded and its output was delivered to its children.
  Completed { output: Batch },
  /// The step failed and the failure was routed to `handler`.
  Routed { error: String, handler: String },
}

/// One entry in a run's execution log.
#[derive(Debug, Clone, Serialize)]
pub struct StepInvocation {
  pub step: String,
  #[serde(rename = "elapsed_ms", serialize_with = "as_millis")]
  pub elapsed: Duration,
  #[serde(flatten)]
  pub outcome: Outcome,
}

/// Result of a run that completed without an unhandled failure.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
  pub run_id: String,
  /// Every invocation, in execution order.
  pub invocations: Vec<StepInvocation>,
}

impl RunResult {
  /// Names of the invoked steps, in execution order. A step reached more
  /// than once appears more than once.
  pub fn executed(&self) -> Vec<&str> {
    self.invocations.iter().map(|i| i.step.as_str()).collect()
  }

  /// Outputs of every successful invocation of `step`, in execution order.
  pub fn outputs(&self, step: &str) -> Vec<&Batch> {
    self
      .invocations
      .iter()
      .filter(|i| i.step == step)
      .filter_map(|i| match &i.outcome {
        Outcome::Completed { output } => Some(output),
        Outcome::Routed { .. } => None,
      })
      .collect()
  }

  /// Output of the most recent successful invocation of `step`.
  pub fn last_output(&self, step: &str) -> Option<&Batch> {
    self.outputs(step).pop()
  }

  /// Invocations whose failure was routed to an error handler.
  pub fn routed(&self) -> impl Iterator<Item = &StepInvocation> {
    self
      .invocations
      .iter()
      .filter(|i| matches!(i.outcome, Outcome::Routed { .. }))
  }
}

fn as_millis<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
  serializer.serialize_f64(elapsed.as_micros() as f64 / 1000.0)
}
