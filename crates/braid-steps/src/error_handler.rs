use async_trait::async_trait;
use braid_step::{Batch, Context, Step, StepError};
use tracing::warn;

/// Handler for routed failures. Logs every error record it receives.
///
/// Unlike a sink it emits its input unchanged, on purpose: steps connected
/// after the handler (alerting, persisting) receive the same error records.
/// Holds no state between runs.
#[derive(Debug, Default, Clone)]
pub struct ErrorHandlerNode;

#[async_trait]
impl Step for ErrorHandlerNode {
  async fn execute(&self, _ctx: &Context, input: Batch) -> Result<Batch, StepError> {
    for record in &input {
      let node = record.get("node").and_then(|v| v.as_str()).unwrap_or("unknown");
      let error = record.get("error").and_then(|v| v.as_str()).unwrap_or("");
      warn!(node = %node, error = %error, "error_record_received");
    }
    Ok(input)
  }
}
