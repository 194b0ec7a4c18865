//! ## Crate Features
//!
//! - `default` enables a default set of features which most control plane components need.
//! - `full` enables all available features.
//! - `time` enables interoperability between [`time::Duration`] and the `time` crate.
//! - `telemetry` enables various helpers for emitting telemetry data.

pub mod builder;
pub mod cli;
pub mod client;
pub mod config;
pub mod iter;
pub mod kvp;
pub mod namespace;
pub mod patchinator;
pub mod quantity;
pub mod status;
pub mod time;
pub mod utils;
pub mod validation;

// External re-exports
pub use k8s_openapi;
pub use kube;
pub use schemars;
// Internal re-exports
pub use radius_shared as shared;
pub use radius_shared::{crd::CustomResourceExt, yaml::YamlSchema};
#[cfg(feature = "telemetry")]
pub use radius_telemetry as telemetry;
