//! Braid Telemetry
//!
//! Two collectors shared by every run in the process:
//! - `braid_step_duration_seconds`: histogram, one observation per step invocation
//! - `braid_step_errors_total`: counter, one increment per failed invocation
//!
//! Both are labelled by step name. [`Metrics::register`] attaches them to a
//! [`prometheus::Registry`]; registering twice against the same registry is
//! a [`TelemetryError`], so a process (or test) creates its collectors once.

mod error;
mod metrics;

pub use error::TelemetryError;
pub use metrics::{Metrics, encode_text};
pub use prometheus::Registry;
