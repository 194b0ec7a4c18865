//! The payload carried by the deployment/deletion queue.

use radius_async_ops::OperationId;
use radius_store::ResourceId;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum WorkKind {
    Deploy,
    Delete,
}

/// One unit of asynchronous work: apply or tear down the output resources of `resource_id`,
/// reporting progress under `operation_id`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkItem {
    pub resource_id: ResourceId,
    pub operation_id: OperationId,
    pub kind: WorkKind,
}
