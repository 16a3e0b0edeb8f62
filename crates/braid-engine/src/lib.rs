//! Braid Workflow Engine
//!
//! Executes a [`Workflow`](braid_workflow::Workflow) from a start step as a
//! depth-first walk, with a per-run input buffer for every step.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      WorkflowRunner                         │
//! │  - owns mpsc channel of trigger batches                     │
//! │  - start(cancel) spawns one run per received batch          │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Engine                             │
//! │  - run(ctx, workflow, start, input) → RunResult             │
//! │  - depth-first walk, input buffers, error routing           │
//! │  - duration / error telemetry per invocation                │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Step::execute                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use braid_engine::{Engine, EngineConfig};
//!
//! let engine = Engine::new(EngineConfig::default());
//! let result = engine.run(&ctx, &workflow, "trigger", input).await?;
//! for name in result.executed() {
//!     println!("{name}");
//! }
//! ```

mod engine;
mod error;
mod events;
mod result;
mod runner;

pub use engine::{
  DEFAULT_MAX_INVOCATIONS, ERROR_FIELD, Engine, EngineConfig, NODE_FIELD, ORIGINAL_INPUT_FIELD,
};
pub use error::RunError;
pub use events::{ChannelNotifier, ExecutionEvent, ExecutionNotifier, NoopNotifier};
pub use result::{Outcome, RunResult, StepInvocation};
pub use runner::WorkflowRunner;
