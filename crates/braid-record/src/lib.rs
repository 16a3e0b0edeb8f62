//! Braid Record
//!
//! The unit of data flowing between workflow steps. A [`Record`] is a
//! schemaless mapping from field name to a [`serde_json::Value`]; a
//! [`Batch`] is an ordered sequence of records.
//!
//! Field access is explicit: the typed accessors return a [`RecordError`]
//! instead of coercing a value of the wrong type.

mod error;
mod record;

pub use error::RecordError;
pub use record::{Batch, Record};
pub use serde_json::Value;
