mod error;
mod registry;

pub use error::RegistryError;
pub use registry::{StepFactory, StepRegistry, decode_config};
