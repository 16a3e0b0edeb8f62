//! Braid Workflow
//!
//! This crate provides the executable workflow representation for braid.
//! A [`Workflow`] owns its step instances together with the forward
//! connection map and the error connection map, and is immutable once built.
//!
//! Key differences from `braid-config`:
//! - Steps are live instances, not declarations
//! - Every connection is validated against the registered step names
//! - Entry points are identified
//!
//! Cycles are accepted; [`Graph::find_cycle`] reports one when present.

mod error;
mod graph;
mod workflow;

pub use error::WorkflowError;
pub use graph::Graph;
pub use workflow::{Workflow, WorkflowBuilder};
