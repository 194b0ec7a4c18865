//! A durable, at-least-once message queue for the worker pool to dequeue deployment and
//! deletion work from.

pub mod dequeuer;
pub mod error;
pub mod memory;
pub mod model;
pub mod queue;

pub use dequeuer::start_dequeuer;
pub use error::Error;
pub use memory::MemoryQueue;
pub use model::{LockToken, Message, MessageId};
pub use queue::Queue;
