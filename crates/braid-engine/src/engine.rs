//! Workflow execution engine.
//!
//! The `Engine` walks a workflow depth-first from a start step. Every step
//! has an input buffer for the run; a successful step appends its whole
//! output to the buffer of each child before any child runs, and a failed
//! step is either routed to its error handler or ends the run.

use std::collections::HashMap;
use std::time::Instant;

use braid_step::{Batch, Context, Record, StepError, Value};
use braid_workflow::Workflow;
use tracing::{debug, error, info, instrument, warn};

use crate::error::RunError;
use crate::events::{ExecutionEvent, ExecutionNotifier, NoopNotifier};
use crate::result::{Outcome, RunResult, StepInvocation};

/// Invocation limit applied by [`EngineConfig::default`].
pub const DEFAULT_MAX_INVOCATIONS: usize = 10_000;

/// Field of an error record holding the failed step's input batch.
pub const ORIGINAL_INPUT_FIELD: &str = "original_input";
/// Field of an error record holding the failure description.
pub const ERROR_FIELD: &str = "error";
/// Field of an error record holding the failed step's name.
pub const NODE_FIELD: &str = "node";

/// Configuration for the engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
  /// Upper bound on step invocations in a single run. `None` disables the
  /// bound, in which case a cyclic workflow can run forever.
  pub max_invocations: Option<usize>,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      max_invocations: Some(DEFAULT_MAX_INVOCATIONS),
    }
  }
}

/// The workflow execution engine.
///
/// Generic over `N: ExecutionNotifier` to allow different notification
/// strategies. Use `Engine::new()` for no-op notifications, or
/// `Engine::with_notifier()` to provide one.
///
/// The engine holds no per-run state, so one instance can serve any number
/// of concurrent runs.
pub struct Engine<N: ExecutionNotifier = NoopNotifier> {
  config: EngineConfig,
  notifier: N,
}

impl Engine<NoopNotifier> {
  pub fn new(config: EngineConfig) -> Self {
    Self::with_notifier(config, NoopNotifier)
  }
}

impl<N: ExecutionNotifier> Engine<N> {
  pub fn with_notifier(config: EngineConfig, notifier: N) -> Self {
    Self { config, notifier }
  }

  pub fn config(&self) -> &EngineConfig {
    &self.config
  }

  pub fn notifier(&self) -> &N {
    &self.notifier
  }

  /// Run `workflow` from `start`, seeding the start step's buffer with
  /// `input`.
  ///
  /// Succeeds when every reached step either completed or had its failure
  /// routed to an error handler. The engine does not check `ctx`'s
  /// cancellation between steps; steps observe it themselves.
  #[instrument(
    name = "run",
    skip(self, ctx, workflow, input),
    fields(workflow = %workflow.name(), start = %start, run_id = tracing::field::Empty)
  )]
  pub async fn run(
    &self,
    ctx: &Context,
    workflow: &Workflow,
    start: &str,
    input: Batch,
  ) -> Result<RunResult, RunError> {
    let run_id = uuid::Uuid::new_v4().to_string();
    tracing::Span::current().record("run_id", run_id.as_str());

    self.notifier.notify(ExecutionEvent::RunStarted {
      run_id: run_id.clone(),
      workflow: workflow.name().to_string(),
      start: start.to_string(),
    });
    info!(input_len = input.len(), "run_started");

    let result = self.walk(ctx, workflow, start, input, &run_id).await;

    match &result {
      Ok(run) => {
        info!(invocations = run.invocations.len(), "run_completed");
        self.notifier.notify(ExecutionEvent::RunCompleted {
          run_id: run_id.clone(),
          invocations: run.invocations.len(),
        });
      }
      Err(e) => {
        error!(error = %e, step = e.step().unwrap_or(""), "run_failed");
        self.notifier.notify(ExecutionEvent::RunFailed {
          run_id: run_id.clone(),
          error: e.to_string(),
        });
      }
    }

    result
  }

  /// The depth-first walk.
  ///
  /// A LIFO worklist stands in for recursion: after a step succeeds its
  /// children are pushed in reverse connection order, so the first child
  /// and everything below it run before the second child is popped.
  async fn walk(
    &self,
    ctx: &Context,
    workflow: &Workflow,
    start: &str,
    input: Batch,
    run_id: &str,
  ) -> Result<RunResult, RunError> {
    let mut buffers: HashMap<String, Batch> = HashMap::new();
    buffers.insert(start.to_string(), input);

    let mut pending = vec![start.to_string()];
    let mut invocations = Vec::new();

    while let Some(name) = pending.pop() {
      if let Some(limit) = self.config.max_invocations
        && invocations.len() >= limit
      {
        warn!(limit, step = %name, "invocation_limit_exceeded");
        return Err(RunError::InvocationLimitExceeded { limit });
      }

      let step = workflow
        .step(&name)
        .ok_or_else(|| RunError::UnknownStep { step: name.clone() })?;

      // Buffers are read, never drained: a step reached again sees
      // everything delivered to it so far in this run.
      let inputs = buffers.get(&name).cloned().unwrap_or_default();
      let handler = workflow.error_handler(&name);
      let retained = handler.map(|_| inputs.clone());

      self.notifier.notify(ExecutionEvent::StepStarted {
        run_id: run_id.to_string(),
        step: name.clone(),
        input_len: inputs.len(),
      });

      let started = Instant::now();
      let result = step.execute(ctx, inputs).await;
      let elapsed = started.elapsed();
      ctx.metrics().observe_duration(&name, elapsed);

      match result {
        Ok(output) => {
          debug!(
            step = %name,
            output_len = output.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "step_completed"
          );
          self.notifier.notify(ExecutionEvent::StepCompleted {
            run_id: run_id.to_string(),
            step: name.clone(),
            output_len: output.len(),
          });

          let children = workflow.downstream(&name);
          for child in children {
            buffers
              .entry(child.clone())
              .or_default()
              .extend(output.iter().cloned());
          }
          pending.extend(children.iter().rev().cloned());

          invocations.push(StepInvocation {
            step: name,
            elapsed,
            outcome: Outcome::Completed { output },
          });
        }
        Err(err) => {
          ctx.metrics().record_error(&name);
          error!(step = %name, error = %err, "step_failed");
          self.notifier.notify(ExecutionEvent::StepFailed {
            run_id: run_id.to_string(),
            step: name.clone(),
            error: err.to_string(),
          });

          let Some(handler) = handler else {
            return Err(RunError::StepFailed {
              step: name,
              source: err,
            });
          };

          info!(step = %name, handler = %handler, "error_routed");
          self.notifier.notify(ExecutionEvent::ErrorRouted {
            run_id: run_id.to_string(),
            step: name.clone(),
            handler: handler.to_string(),
          });

          buffers
            .entry(handler.to_string())
            .or_default()
            .push(error_record(retained.unwrap_or_default(), &err, &name));
          // The handler replaces the failed step's children.
          pending.push(handler.to_string());

          invocations.push(StepInvocation {
            step: name,
            elapsed,
            outcome: Outcome::Routed {
              error: err.to_string(),
              handler: handler.to_string(),
            },
          });
        }
      }
    }

    Ok(RunResult {
      run_id: run_id.to_string(),
      invocations,
    })
  }
}

/// The record delivered to an error handler when `step` fails on `input`.
fn error_record(input: Batch, err: &StepError, step: &str) -> Record {
  Record::from_iter([
    (
      ORIGINAL_INPUT_FIELD,
      Value::Array(input.into_iter().map(Value::from).collect()),
    ),
    (ERROR_FIELD, Value::String(err.to_string())),
    (NODE_FIELD, Value::String(step.to_string())),
  ])
}
