//! Execution events and notifiers for observability.
//!
//! Events are emitted during a run so consumers can observe progress,
//! persist state, stream to a UI, etc.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Events emitted during a workflow run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExecutionEvent {
  /// A run has started.
  RunStarted {
    run_id: String,
    workflow: String,
    start: String,
  },

  /// A step invocation has started.
  StepStarted {
    run_id: String,
    step: String,
    input_len: usize,
  },

  /// A step invocation has completed successfully.
  StepCompleted {
    run_id: String,
    step: String,
    output_len: usize,
  },

  /// A step invocation has failed.
  StepFailed {
    run_id: String,
    step: String,
    error: String,
  },

  /// A failure was routed to the step's error handler.
  ErrorRouted {
    run_id: String,
    step: String,
    handler: String,
  },

  /// The run has completed successfully.
  RunCompleted { run_id: String, invocations: usize },

  /// The run has failed.
  RunFailed { run_id: String, error: String },
}

/// Trait for receiving execution events.
///
/// The engine calls `notify` for each event; implementations decide what
/// to do with them.
pub trait ExecutionNotifier: Send + Sync {
  fn notify(&self, event: ExecutionEvent);
}

/// A notifier that discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl ExecutionNotifier for NoopNotifier {
  fn notify(&self, _event: ExecutionEvent) {}
}

/// A notifier that sends events to an unbounded channel.
///
/// Unbounded so a slow consumer never stalls a run. Volume is a handful of
/// events per step invocation.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  sender: mpsc::UnboundedSender<ExecutionEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<ExecutionEvent>) -> Self {
    Self { sender }
  }

  /// Create a notifier together with the receiving end of its channel.
  pub fn channel() -> (Self, mpsc::UnboundedReceiver<ExecutionEvent>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (Self::new(sender), receiver)
  }
}

impl ExecutionNotifier for ChannelNotifier {
  fn notify(&self, event: ExecutionEvent) {
    // receiver may have been dropped
    let _ = self.sender.send(event);
  }
}

impl<T: ExecutionNotifier + ?Sized> ExecutionNotifier for std::sync::Arc<T> {
  fn notify(&self, event: ExecutionEvent) {
    (**self).notify(event)
  }
}
