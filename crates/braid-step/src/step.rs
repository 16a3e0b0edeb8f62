use async_trait::async_trait;
use braid_record::Batch;

use crate::context::Context;
use crate::error::StepError;

/// A single node of a workflow graph.
///
/// `execute` consumes a batch (possibly empty) and produces a batch
/// (possibly empty). It may block on I/O or timers; the engine awaits it to
/// completion before moving on, so within one run steps never overlap.
///
/// Instances are shared across concurrent runs behind an `Arc`. Keep them
/// stateless, or synchronize any internal state yourself.
#[async_trait]
pub trait Step: Send + Sync {
  async fn execute(&self, ctx: &Context, input: Batch) -> Result<Batch, StepError>;
}
