use std::collections::HashSet;

use braid_config::WorkflowDef;
use braid_registry::StepRegistry;
use braid_workflow::Workflow;
use tracing::{debug, warn};

use crate::error::ResolveError;

/// Resolver transforms a WorkflowDef into an executable Workflow.
pub trait Resolver: Send + Sync {
  /// Resolve a workflow definition.
  ///
  /// This process:
  /// 1. Rejects duplicate step names
  /// 2. Instantiates every step through the step registry
  /// 3. Builds the workflow, validating forward and error connections
  fn resolve(&self, def: &WorkflowDef) -> Result<Workflow, ResolveError>;
}

/// Standard resolver implementation backed by a [`StepRegistry`].
pub struct StandardResolver {
  registry: StepRegistry,
}

impl StandardResolver {
  pub fn new(registry: StepRegistry) -> Self {
    Self { registry }
  }

  pub fn registry(&self) -> &StepRegistry {
    &self.registry
  }
}

impl Resolver for StandardResolver {
  fn resolve(&self, def: &WorkflowDef) -> Result<Workflow, ResolveError> {
    let mut names = HashSet::new();
    for step in &def.steps {
      if !names.insert(step.name.as_str()) {
        return Err(ResolveError::DuplicateStep {
          step: step.name.clone(),
        });
      }
    }

    let mut builder = Workflow::builder(def.name.clone());
    for step_def in &def.steps {
      let step = self.registry.create(step_def)?;
      builder = builder.step_arc(step_def.name.clone(), step);
    }

    for (from, children) in &def.connections {
      for to in children {
        builder = builder.connect(from.clone(), to.clone());
      }
    }

    for (step, handler) in &def.error_connections {
      builder = builder.on_error(step.clone(), handler.clone());
    }

    let workflow = builder.build()?;

    if let Some(cycle) = workflow.find_cycle() {
      warn!(
        workflow = %workflow.name(),
        cycle = %cycle.join(" -> "),
        "workflow_graph_cyclic"
      );
    }

    debug!(
      workflow = %workflow.name(),
      steps = workflow.step_names().len(),
      "workflow_resolved"
    );

    Ok(workflow)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Arc;

  use async_trait::async_trait;
  use braid_config::StepDef;
  use braid_registry::RegistryError;
  use braid_step::{Batch, Context, Step, StepError};
  use braid_workflow::WorkflowError;
  use serde_json::json;

  struct MockStep;

  #[async_trait]
  impl Step for MockStep {
    async fn execute(&self, _ctx: &Context, input: Batch) -> Result<Batch, StepError> {
      Ok(input)
    }
  }

  fn mock_registry() -> StepRegistry {
    let mut registry = StepRegistry::new();
    registry
      .register("mock", |_def: &StepDef| -> Result<Arc<dyn Step>, StepError> {
        Ok(Arc::new(MockStep))
      })
      .unwrap();
    registry
      .register("strict", |def: &StepDef| -> Result<Arc<dyn Step>, StepError> {
        if def.config.contains_key("required") {
          Ok(Arc::new(MockStep))
        } else {
          Err(StepError::invalid_config("missing 'required'"))
        }
      })
      .unwrap();
    registry
  }

  fn def(steps: &[(&str, &str)], connections: &[(&str, &[&str])]) -> WorkflowDef {
    WorkflowDef {
      name: "test".to_string(),
      steps: steps
        .iter()
        .map(|(name, step_type)| StepDef::new(*name, *step_type))
        .collect(),
      connections: connections
        .iter()
        .map(|(from, to)| {
          (
            from.to_string(),
            to.iter().map(|s| s.to_string()).collect(),
          )
        })
        .collect(),
      ..Default::default()
    }
  }

  #[test]
  fn test_resolve_simple_workflow() {
    let resolver = StandardResolver::new(mock_registry());

    let workflow = resolver
      .resolve(&def(
        &[("a", "mock"), ("b", "mock"), ("c", "mock")],
        &[("a", &["b", "c"])],
      ))
      .unwrap();

    assert_eq!(workflow.name(), "test");
    assert_eq!(workflow.step_names(), ["a", "b", "c"]);
    assert_eq!(workflow.downstream("a"), ["b", "c"]);
    assert_eq!(workflow.graph().entry_points(), ["a"]);
  }

  #[test]
  fn test_resolve_error_connections() {
    let resolver = StandardResolver::new(mock_registry());

    let mut definition = def(&[("a", "mock"), ("h", "mock")], &[]);
    definition
      .error_connections
      .insert("a".to_string(), "h".to_string());

    let workflow = resolver.resolve(&definition).unwrap();
    assert_eq!(workflow.error_handler("a"), Some("h"));
  }

  #[test]
  fn test_resolve_fails_on_duplicate_step() {
    let resolver = StandardResolver::new(mock_registry());

    let result = resolver.resolve(&def(&[("a", "mock"), ("a", "mock")], &[]));
    assert!(matches!(result, Err(ResolveError::DuplicateStep { step }) if step == "a"));
  }

  #[test]
  fn test_resolve_fails_on_unknown_type() {
    let resolver = StandardResolver::new(mock_registry());

    let result = resolver.resolve(&def(&[("a", "missing")], &[]));
    assert!(matches!(
      result,
      Err(ResolveError::Registry(RegistryError::UnknownType { .. }))
    ));
  }

  #[test]
  fn test_resolve_fails_on_invalid_config() {
    let resolver = StandardResolver::new(mock_registry());

    let result = resolver.resolve(&def(&[("a", "strict")], &[]));
    assert!(matches!(
      result,
      Err(ResolveError::Registry(RegistryError::InvalidConfig { .. }))
    ));

    let mut ok = def(&[("a", "strict")], &[]);
    ok.steps[0] = StepDef::new("a", "strict").with("required", json!(true));
    assert!(resolver.resolve(&ok).is_ok());
  }

  #[test]
  fn test_resolve_fails_on_unknown_connection_target() {
    let resolver = StandardResolver::new(mock_registry());

    let result = resolver.resolve(&def(&[("a", "mock")], &[("a", &["ghost"])]));
    assert!(matches!(
      result,
      Err(ResolveError::Workflow(WorkflowError::InvalidConnection { .. }))
    ));
  }

  #[test]
  fn test_resolve_accepts_cycles() {
    let resolver = StandardResolver::new(mock_registry());

    let workflow = resolver
      .resolve(&def(
        &[("a", "mock"), ("b", "mock")],
        &[("a", &["b"]), ("b", &["a"])],
      ))
      .unwrap();

    assert!(workflow.find_cycle().is_some());
  }
}
