use std::sync::Arc;

use radius_async_ops::AsyncOperationTracker;
use radius_queue::Queue;
use radius_store::ResourceStore;
use radius_worker::WorkItem;
use serde_json::Value;

/// The services the ARM request pipeline talks to directly: the resource store (A) for
/// synchronous reads/writes and the queue (B) plus async-operation tracker (E) for handing off
/// and reporting on long-running create/update/delete work.
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn ResourceStore<Value>>,
    pub queue: Arc<dyn Queue<WorkItem>>,
    pub operations: Arc<dyn AsyncOperationTracker>,
}
