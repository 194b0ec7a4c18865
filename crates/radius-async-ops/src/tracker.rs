use async_trait::async_trait;
use radius_store::{ProvisioningState, ResourceId};

use crate::{
    error::Result,
    model::{OperationError, OperationId, OperationStatus},
};

/// Tracks the lifecycle of a single long-running ARM request so a client can poll it via
/// `Azure-AsyncOperation`/`Location` while the request is processed asynchronously by the
/// worker pool.
#[async_trait]
pub trait AsyncOperationTracker: Send + Sync {
    /// Records a new, non-terminal operation for `resource_id` and returns its id.
    async fn start(&self, resource_id: ResourceId) -> Result<OperationStatus>;

    /// Updates the progress of an in-flight operation. Rejected once the operation has
    /// already reached a terminal state.
    async fn update_progress(&self, id: &OperationId, percent_complete: u8) -> Result<()>;

    /// Publishes the operation's terminal state exactly once; `status` must satisfy
    /// [`ProvisioningState::is_terminal`].
    async fn complete(
        &self,
        id: &OperationId,
        status: ProvisioningState,
        error: Option<OperationError>,
    ) -> Result<()>;

    async fn get(&self, id: &OperationId) -> Result<OperationStatus>;
}
