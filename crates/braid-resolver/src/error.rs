use thiserror::Error;

/// Errors that can occur during workflow resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
  /// Duplicate step name in the definition.
  #[error("duplicate step name: {step}")]
  DuplicateStep { step: String },

  /// A step could not be instantiated.
  #[error(transparent)]
  Registry(#[from] braid_registry::RegistryError),

  /// The instantiated steps do not form a valid workflow.
  #[error(transparent)]
  Workflow(#[from] braid_workflow::WorkflowError),
}
