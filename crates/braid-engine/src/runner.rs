//! Workflow runner with channel-based triggering.
//!
//! The `WorkflowRunner` owns an mpsc channel for receiving trigger batches
//! and starts one engine run per batch.

use std::sync::Arc;

use braid_step::{Batch, Context};
use braid_workflow::Workflow;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::SendError;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{error, info};

use crate::engine::Engine;
use crate::error::RunError;
use crate::events::{ExecutionNotifier, NoopNotifier};
use crate::result::RunResult;

/// A runner that executes a workflow in response to trigger batches.
///
/// Runs triggered through the channel execute concurrently. They share the
/// engine, the workflow and the context's metrics; each gets its own input
/// buffers and a child cancellation token.
///
/// # Usage
///
/// ```ignore
/// let runner = WorkflowRunner::new(engine, workflow, "trigger", ctx);
///
/// // Get sender for external triggers (webhooks, schedulers, etc.)
/// let sender = runner.sender();
///
/// // Start the execution loop
/// let cancel = CancellationToken::new();
/// runner.start(cancel).await;
/// ```
pub struct WorkflowRunner<N: ExecutionNotifier = NoopNotifier> {
  sender: mpsc::Sender<Batch>,
  receiver: mpsc::Receiver<Batch>,
  engine: Arc<Engine<N>>,
  workflow: Arc<Workflow>,
  start: String,
  ctx: Context,
}

impl<N: ExecutionNotifier + 'static> WorkflowRunner<N> {
  pub fn new(
    engine: Arc<Engine<N>>,
    workflow: Arc<Workflow>,
    start: impl Into<String>,
    ctx: Context,
  ) -> Self {
    Self::with_buffer_size(engine, workflow, start, ctx, 100)
  }

  /// Create a new workflow runner with a custom channel capacity.
  pub fn with_buffer_size(
    engine: Arc<Engine<N>>,
    workflow: Arc<Workflow>,
    start: impl Into<String>,
    ctx: Context,
    buffer_size: usize,
  ) -> Self {
    let (sender, receiver) = mpsc::channel(buffer_size);
    Self {
      sender,
      receiver,
      engine,
      workflow,
      start: start.into(),
      ctx,
    }
  }

  /// Get a sender handle for triggering runs.
  pub fn sender(&self) -> mpsc::Sender<Batch> {
    self.sender.clone()
  }

  /// Trigger a run with the given batch.
  pub async fn run(&self, batch: Batch) -> Result<(), SendError<Batch>> {
    self.sender.send(batch).await
  }

  pub fn workflow(&self) -> &Workflow {
    &self.workflow
  }

  /// Start the execution loop.
  ///
  /// Returns once the cancellation token is triggered or every sender has
  /// been dropped, after the runs already started have finished.
  pub async fn start(mut self, cancel: CancellationToken) {
    info!(workflow = %self.workflow.name(), start = %self.start, "runner_started");

    // The runner holds a sender of its own; drop it so the channel closes
    // when the last external sender goes away.
    drop(self.sender);

    let tracker = TaskTracker::new();
    // Every run gets a child of this scope, so cancelling the runner
    // cancels its in-flight runs.
    let scope = self.ctx.clone().with_cancellation(cancel.clone());

    loop {
      tokio::select! {
        _ = cancel.cancelled() => {
          info!(workflow = %self.workflow.name(), "runner_cancelled");
          break;
        }
        batch = self.receiver.recv() => {
          let Some(batch) = batch else {
            info!(workflow = %self.workflow.name(), "runner_channel_closed");
            break;
          };

          let engine = self.engine.clone();
          let workflow = self.workflow.clone();
          let start = self.start.clone();
          let ctx = scope.child();

          tracker.spawn(async move {
            match engine.run(&ctx, &workflow, &start, batch).await {
              Ok(result) => info!(
                workflow = %workflow.name(),
                run_id = %result.run_id,
                invocations = result.invocations.len(),
                "triggered_run_completed"
              ),
              Err(e) => error!(
                workflow = %workflow.name(),
                error = %e,
                "triggered_run_failed"
              ),
            }
          });
        }
      }
    }

    tracker.close();
    tracker.wait().await;
  }

  /// Execute a single run directly, bypassing the channel.
  pub async fn execute_once(
    &self,
    batch: Batch,
    cancel: CancellationToken,
  ) -> Result<RunResult, RunError> {
    let ctx = self.ctx.clone().with_cancellation(cancel);
    self.engine.run(&ctx, &self.workflow, &self.start, batch).await
  }
}
