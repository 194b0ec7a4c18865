//! The worker pool (component F): dequeues deployment and deletion work, drives it through
//! the renderer and deployment processor, and publishes the terminal async-operation status.

pub mod deployer;
pub mod error;
pub mod model;
pub mod pool;

pub use deployer::Deployer;
pub use error::Error;
pub use model::{WorkItem, WorkKind};
