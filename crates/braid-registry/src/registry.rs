use std::collections::BTreeMap;
use std::sync::Arc;

use braid_config::StepDef;
use braid_step::{Step, StepError};
use serde::de::DeserializeOwned;

use crate::error::RegistryError;

/// Builds a step instance from its declaration.
///
/// Implemented for any `Fn(&StepDef) -> Result<Arc<dyn Step>, StepError>`,
/// so most registrations are plain closures.
pub trait StepFactory: Send + Sync {
  fn create(&self, def: &StepDef) -> Result<Arc<dyn Step>, StepError>;
}

impl<F> StepFactory for F
where
  F: Fn(&StepDef) -> Result<Arc<dyn Step>, StepError> + Send + Sync,
{
  fn create(&self, def: &StepDef) -> Result<Arc<dyn Step>, StepError> {
    self(def)
  }
}

/// Type tag -> factory table consulted at graph-build time.
#[derive(Default)]
pub struct StepRegistry {
  factories: BTreeMap<String, Arc<dyn StepFactory>>,
}

impl StepRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a factory under a type tag. A tag can only be registered once.
  pub fn register(
    &mut self,
    step_type: impl Into<String>,
    factory: impl StepFactory + 'static,
  ) -> Result<(), RegistryError> {
    let step_type = step_type.into();
    if self.factories.contains_key(&step_type) {
      return Err(RegistryError::DuplicateType(step_type));
    }
    self.factories.insert(step_type, Arc::new(factory));
    Ok(())
  }

  pub fn contains(&self, step_type: &str) -> bool {
    self.factories.contains_key(step_type)
  }

  /// Registered type tags, sorted.
  pub fn types(&self) -> Vec<&str> {
    self.factories.keys().map(String::as_str).collect()
  }

  /// Instantiate the step a declaration describes.
  pub fn create(&self, def: &StepDef) -> Result<Arc<dyn Step>, RegistryError> {
    let factory = self
      .factories
      .get(&def.step_type)
      .ok_or_else(|| RegistryError::UnknownType {
        step: def.name.clone(),
        step_type: def.step_type.clone(),
      })?;

    factory
      .create(def)
      .map_err(|source| RegistryError::InvalidConfig {
        step: def.name.clone(),
        source,
      })
  }
}

/// Deserialize a declaration's configuration block into a typed config.
pub fn decode_config<T: DeserializeOwned>(def: &StepDef) -> Result<T, StepError> {
  serde_json::from_value(def.config_value()).map_err(|e| StepError::invalid_config(e.to_string()))
}
