//! Braid Config
//!
//! This crate contains the serializable workflow configuration types for braid.
//! These types represent workflow definitions before their steps are
//! instantiated by a step registry.
//!
//! Configuration can be loaded from:
//! - YAML files (the default)
//! - JSON files (by `.json` extension)
//! - n8n flow exports, via [`convert_n8n`]
//!
//! ```yaml
//! name: enrich-contacts
//! start: trigger
//! steps:
//!   - name: trigger
//!     type: manualTrigger
//!     payload:
//!       - { email: "a@example.com" }
//!   - name: tag
//!     type: setNode
//!     setValues: { source: "import" }
//!   - name: on_error
//!     type: errorHandlerNode
//! connections:
//!   trigger: [tag]
//! errorConnections:
//!   tag: on_error
//! ```

mod error;
mod n8n;
mod step;
mod workflow;

pub use error::ConfigError;
pub use n8n::{PLACEHOLDER_STEP_TYPE, convert_n8n};
pub use step::StepDef;
pub use workflow::WorkflowDef;
