//! Orders a deployment's output resources by dependency and dispatches them to their
//! registered handlers (component H).

pub mod error;
pub mod graph;
pub mod handler;
pub mod processor;

pub use error::{Error, Result};
pub use graph::topological_order;
pub use handler::{HandlerRegistry, OutputResourceHandler, PutResult};
pub use processor::DeploymentProcessor;
