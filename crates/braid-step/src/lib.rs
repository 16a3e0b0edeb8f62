//! Braid Step
//!
//! The contract every workflow step implements, and the shared [`Context`]
//! handed to each invocation.
//!
//! The engine only ever calls [`Step::execute`]. How a step was built (from a
//! declarative config block, in a test, by hand) is a graph-build concern
//! and lives elsewhere.

mod context;
mod error;
mod step;

pub use braid_record::{Batch, Record, RecordError, Value};
pub use context::Context;
pub use error::StepError;
pub use step::Step;
