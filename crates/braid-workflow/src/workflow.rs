use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use braid_step::Step;

use crate::error::WorkflowError;
use crate::graph::Graph;

/// A built workflow ready for execution.
///
/// Holds the step instances keyed by unique name and the graph over them.
/// Nothing about a workflow changes while it runs.
#[derive(Clone)]
pub struct Workflow {
  name: String,
  order: Vec<String>,
  steps: HashMap<String, Arc<dyn Step>>,
  graph: Graph,
}

impl Workflow {
  pub fn builder(name: impl Into<String>) -> WorkflowBuilder {
    WorkflowBuilder::new(name)
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// Get a step instance by name.
  pub fn step(&self, name: &str) -> Option<&Arc<dyn Step>> {
    self.steps.get(name)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.steps.contains_key(name)
  }

  /// Step names in the order they were added.
  pub fn step_names(&self) -> &[String] {
    &self.order
  }

  /// Children of `name`, in connection order.
  pub fn downstream(&self, name: &str) -> &[String] {
    self.graph.downstream(name)
  }

  pub fn error_handler(&self, name: &str) -> Option<&str> {
    self.graph.error_handler(name)
  }

  pub fn graph(&self) -> &Graph {
    &self.graph
  }

  /// A cycle over forward and error connections, if there is one.
  pub fn find_cycle(&self) -> Option<Vec<String>> {
    self.graph.find_cycle()
  }
}

impl fmt::Debug for Workflow {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Workflow")
      .field("name", &self.name)
      .field("steps", &self.order)
      .field("graph", &self.graph)
      .finish()
  }
}

/// Incremental construction of a [`Workflow`]. Validation happens in
/// [`WorkflowBuilder::build`].
pub struct WorkflowBuilder {
  name: String,
  steps: Vec<(String, Arc<dyn Step>)>,
  connections: Vec<(String, String)>,
  error_connections: Vec<(String, String)>,
}

impl WorkflowBuilder {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      steps: Vec::new(),
      connections: Vec::new(),
      error_connections: Vec::new(),
    }
  }

  pub fn step(self, name: impl Into<String>, step: impl Step + 'static) -> Self {
    self.step_arc(name, Arc::new(step))
  }

  pub fn step_arc(mut self, name: impl Into<String>, step: Arc<dyn Step>) -> Self {
    self.steps.push((name.into(), step));
    self
  }

  /// Append `to` to the children of `from`. Order of calls is delivery order.
  pub fn connect(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
    self.connections.push((from.into(), to.into()));
    self
  }

  /// Designate `handler` as the error handler of `step`.
  pub fn on_error(mut self, step: impl Into<String>, handler: impl Into<String>) -> Self {
    self.error_connections.push((step.into(), handler.into()));
    self
  }

  pub fn build(self) -> Result<Workflow, WorkflowError> {
    let mut order = Vec::with_capacity(self.steps.len());
    let mut steps = HashMap::with_capacity(self.steps.len());
    for (name, step) in self.steps {
      if steps.insert(name.clone(), step).is_some() {
        return Err(WorkflowError::DuplicateStep(name));
      }
      order.push(name);
    }

    for (from, to) in &self.connections {
      if !steps.contains_key(from) || !steps.contains_key(to) {
        return Err(WorkflowError::InvalidConnection {
          from: from.clone(),
          to: to.clone(),
        });
      }
    }

    let mut handled: HashMap<&str, &str> = HashMap::new();
    for (step, handler) in &self.error_connections {
      if !steps.contains_key(step) || !steps.contains_key(handler) {
        return Err(WorkflowError::InvalidErrorConnection {
          step: step.clone(),
          handler: handler.clone(),
        });
      }
      if step == handler {
        return Err(WorkflowError::SelfHandler(step.clone()));
      }
      if let Some(existing) = handled.insert(step, handler) {
        return Err(WorkflowError::DuplicateErrorHandler {
          step: step.clone(),
          existing: existing.to_string(),
        });
      }
    }

    let graph = Graph::new(&order, &self.connections, &self.error_connections);

    Ok(Workflow {
      name: self.name,
      order,
      steps,
      graph,
    })
  }
}
