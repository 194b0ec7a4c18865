//! Versioned persistence for Radius resources with optimistic concurrency.
//!
//! ## Crate Features
//!
//! - `default` pulls in the `kubernetes` feature.
//! - `kubernetes` enables the CRD-backed [`ResourceStore`] implementation; without it only
//!   the embedded [`memory::MemoryStore`] is available, which is sufficient for tests and for
//!   a `storageProvider: inmemory` deployment.

pub mod error;
#[cfg(feature = "kubernetes")]
pub mod kubernetes;
pub mod memory;
pub mod model;
pub mod store;

pub use error::Error;
pub use memory::MemoryStore;
pub use model::{ETag, OutputResource, ProvisioningState, ResourceId, SystemData, TrackedResource};
pub use store::{Page, ResourceStore};
