use async_trait::async_trait;
use braid_step::{Batch, Context, Step, StepError};

/// Passes its input through. Placeholder type for converted flows.
#[derive(Debug, Default, Clone)]
pub struct NoOp;

#[async_trait]
impl Step for NoOp {
  async fn execute(&self, _ctx: &Context, input: Batch) -> Result<Batch, StepError> {
    Ok(input)
  }
}
