//! Drives one [`WorkItem`] end to end: load the tracked resource, render it, apply or tear
//! down its output resources, and publish the result.

use std::sync::Arc;

use radius_async_ops::AsyncOperationTracker;
use radius_processor::DeploymentProcessor;
use radius_render::{RenderInput, RendererRegistry};
use radius_store::{ProvisioningState, ResourceId, ResourceStore};
use serde_json::Value;
use snafu::ResultExt as _;
use tracing::{info, instrument, warn};

use crate::{
    error::{OperationSnafu, ProcessSnafu, RenderSnafu, Result, StoreSnafu},
    model::{WorkItem, WorkKind},
};

/// The services a worker needs to carry a [`WorkItem`] to completion.
///
/// Holds the resource store (A), the application model (I), the deployment processor (H), and
/// the async-operation tracker (E) — everything downstream of the queue (B) that a deploy or
/// delete actually touches.
pub struct Deployer {
    pub store: Arc<dyn ResourceStore<Value>>,
    pub renderers: Arc<RendererRegistry>,
    pub processor: Arc<DeploymentProcessor>,
    pub operations: Arc<dyn AsyncOperationTracker>,
}

/// Extracts the ARM resource-group segment from a resource id to use as the Kubernetes
/// namespace output resources are rendered into.
fn namespace_for(id: &ResourceId) -> String {
    let segments: Vec<&str> = id.as_str().trim_matches('/').split('/').collect();
    segments
        .iter()
        .position(|s| s.eq_ignore_ascii_case("resourcegroups"))
        .and_then(|i| segments.get(i + 1))
        .unwrap_or(&"default")
        .to_lowercase()
}

impl Deployer {
    #[instrument(skip(self), fields(resource_id = %item.resource_id, operation_id = %item.operation_id))]
    pub async fn process(&self, item: &WorkItem) -> Result<()> {
        match item.kind {
            WorkKind::Deploy => self.deploy(item).await,
            WorkKind::Delete => self.teardown(item).await,
        }
    }

    async fn deploy(&self, item: &WorkItem) -> Result<()> {
        self.operations
            .update_progress(&item.operation_id, 10)
            .await
            .context(OperationSnafu)?;

        let (mut resource, etag) = self.store.get(&item.resource_id).await.context(StoreSnafu)?;
        let namespace = namespace_for(&item.resource_id);

        let renderer = self
            .renderers
            .renderer_for(&resource.resource_type)
            .context(RenderSnafu)?;
        let render_output = renderer
            .render(RenderInput {
                resource_id: &item.resource_id,
                resource_name: item.resource_id.name(),
                namespace: &namespace,
                properties: &resource.properties,
                dependencies: &[],
            })
            .context(RenderSnafu)?;

        self.operations
            .update_progress(&item.operation_id, 50)
            .await
            .context(OperationSnafu)?;

        let applied = self
            .processor
            .deploy(&render_output.output_resources)
            .await
            .context(ProcessSnafu)?;

        resource.output_resources = applied;
        resource.provisioning_state = ProvisioningState::Succeeded;
        self.store
            .save(resource, Some(&etag))
            .await
            .context(StoreSnafu)?;

        self.operations
            .complete(&item.operation_id, ProvisioningState::Succeeded, None)
            .await
            .context(OperationSnafu)?;

        info!("deployment succeeded");
        Ok(())
    }

    async fn teardown(&self, item: &WorkItem) -> Result<()> {
        let (resource, _etag) = self.store.get(&item.resource_id).await.context(StoreSnafu)?;

        self.processor
            .delete(&resource.output_resources)
            .await
            .context(ProcessSnafu)?;

        self.store
            .delete(&item.resource_id, None)
            .await
            .context(StoreSnafu)?;

        self.operations
            .complete(&item.operation_id, ProvisioningState::Succeeded, None)
            .await
            .context(OperationSnafu)?;

        info!("deletion succeeded");
        Ok(())
    }

    /// Marks the operation (and, where possible, the resource) failed after a permanent error.
    /// Called by the pool rather than `process` so transient errors never reach this path.
    pub async fn fail(&self, item: &WorkItem, message: String) {
        let error = radius_async_ops::OperationError {
            code: "HandlerFailed".to_string(),
            message,
        };
        if let Err(source) = self
            .operations
            .complete(&item.operation_id, ProvisioningState::Failed, Some(error))
            .await
        {
            warn!(%source, "failed to publish operation failure");
        }

        if let Ok((mut resource, etag)) = self.store.get(&item.resource_id).await {
            resource.provisioning_state = ProvisioningState::Failed;
            if let Err(source) = self.store.save(resource, Some(&etag)).await {
                warn!(%source, "failed to mark resource failed");
            }
        }
    }
}
