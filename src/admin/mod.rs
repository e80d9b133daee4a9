pub mod record;
pub mod registry;

pub use record::AdminRecord;
pub use registry::{AdminRegistry, RegistryError};
