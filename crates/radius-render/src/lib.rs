//! Renders Radius resources into the platform-specific output resources their handlers apply,
//! and the application model registry (component I) that looks up a renderer by resource type.

pub mod container;
pub mod error;
pub mod model;
pub mod renderer;
pub mod route;

pub use container::ContainerRenderer;
pub use error::Error;
pub use model::{RenderInput, RenderOutput, ResolvedDependency, SecretReference};
pub use renderer::{Renderer, RendererRegistry};
pub use route::RouteRenderer;
