//! Namespaced secret persistence and output-resource secret value derivation for the Radius
//! resource-provider runtime.

pub mod error;
pub mod memory;
pub mod model;
pub mod store;
pub mod transform;

pub use error::Error;
pub use memory::MemorySecretStore;
pub use model::{Secret, SecretVersion};
pub use store::SecretStore;
pub use transform::{SecretTransformerRegistry, SecretValueTransformer};
