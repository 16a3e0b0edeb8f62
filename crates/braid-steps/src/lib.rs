//! Braid Steps
//!
//! The built-in step catalogue. Each step has a typed, camelCase config
//! decoded from its declaration, and is registered under the type tag used
//! in workflow files:
//!
//! | tag                  | step                 |
//! |----------------------|----------------------|
//! | `manualTrigger`      | [`ManualTrigger`]    |
//! | `webhookTrigger`     | [`WebhookTrigger`]   |
//! | `noOp`               | [`NoOp`]             |
//! | `setNode`            | [`SetNode`]          |
//! | `dedupeNode`         | [`DedupeNode`]       |
//! | `mergeNode`          | [`MergeNode`]        |
//! | `mergeByKeyNode`     | [`MergeByKeyNode`]   |
//! | `splitInBatchesNode` | [`SplitInBatches`]   |
//! | `switchNode`         | [`SwitchNode`]       |
//! | `waitNode`           | [`WaitNode`]         |
//! | `waitForNode`        | [`WaitForNode`]      |
//! | `errorHandlerNode`   | [`ErrorHandlerNode`] |
//! | `httpRequest`        | [`HttpRequest`]      |

use std::sync::Arc;

use braid_config::StepDef;
use braid_registry::{RegistryError, StepFactory, StepRegistry, decode_config};
use braid_step::{Step, StepError};
use serde::de::DeserializeOwned;

mod dedupe;
mod error_handler;
mod http_request;
mod merge;
mod noop;
mod set;
mod split;
mod switch;
mod template;
mod trigger;
mod wait;

pub use dedupe::{DedupeConfig, DedupeNode};
pub use error_handler::ErrorHandlerNode;
pub use http_request::{HttpRequest, HttpRequestConfig};
pub use merge::{MergeByKeyNode, MergeConfig, MergeNode};
pub use noop::NoOp;
pub use set::{SetConfig, SetNode};
pub use split::{SplitConfig, SplitInBatches};
pub use switch::{Condition, SwitchConfig, SwitchNode};
pub use trigger::{ManualTrigger, ManualTriggerConfig, WebhookTrigger};
pub use wait::{WaitConfig, WaitForConfig, WaitForNode, WaitNode};

/// Register every built-in step type.
pub fn register_builtins(registry: &mut StepRegistry) -> Result<(), RegistryError> {
  registry.register("manualTrigger", configured(ManualTrigger::new))?;
  registry.register("webhookTrigger", stateless::<WebhookTrigger>())?;
  registry.register("noOp", stateless::<NoOp>())?;
  registry.register("setNode", configured(SetNode::new))?;
  registry.register("dedupeNode", configured(DedupeNode::new))?;
  registry.register("mergeNode", configured(MergeNode::new))?;
  registry.register("mergeByKeyNode", configured(MergeByKeyNode::new))?;
  registry.register("splitInBatchesNode", configured(SplitInBatches::new))?;
  registry.register("switchNode", configured(SwitchNode::new))?;
  registry.register("waitNode", configured(WaitNode::new))?;
  registry.register("waitForNode", configured(WaitForNode::new))?;
  registry.register("errorHandlerNode", stateless::<ErrorHandlerNode>())?;
  registry.register("httpRequest", configured(HttpRequest::new))?;
  Ok(())
}

/// A registry holding exactly the built-in step types.
pub fn builtin_registry() -> Result<StepRegistry, RegistryError> {
  let mut registry = StepRegistry::new();
  register_builtins(&mut registry)?;
  Ok(registry)
}

/// Grouping key for a record: the canonical JSON text of `field`, so that
/// values of any type compare by content.
pub(crate) fn group_key(record: &braid_step::Record, field: &str) -> Option<String> {
  record.get(field).map(|value| value.to_string())
}

fn configured<S, C>(build: fn(C) -> S) -> impl StepFactory
where
  S: Step + 'static,
  C: DeserializeOwned + 'static,
{
  move |def: &StepDef| -> Result<Arc<dyn Step>, StepError> {
    Ok(Arc::new(build(decode_config(def)?)))
  }
}

fn stateless<S>() -> impl StepFactory
where
  S: Step + Default + 'static,
{
  |_def: &StepDef| -> Result<Arc<dyn Step>, StepError> { Ok(Arc::new(S::default())) }
}
