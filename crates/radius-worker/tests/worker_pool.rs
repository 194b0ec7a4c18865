use std::sync::Arc;

use radius_async_ops::{AsyncOperationTracker, MemoryOperationTracker};
use radius_processor::{DeploymentProcessor, HandlerRegistry};
use radius_queue::{MemoryQueue, Queue, start_dequeuer};
use radius_render::{RendererRegistry, RouteRenderer};
use radius_shared::time::Duration;
use radius_store::{MemoryStore, ProvisioningState, ResourceId, ResourceStore, SystemData, TrackedResource};
use radius_worker::{Deployer, WorkItem, WorkKind};
use serde_json::{Value, json};
use tokio::sync::watch;

fn system_data() -> SystemData {
    SystemData {
        created_at: "2024-01-01T00:00:00Z".to_string(),
        created_by: "tester".to_string(),
        created_by_type: "User".to_string(),
        last_modified_at: "2024-01-01T00:00:00Z".to_string(),
        last_modified_by: "tester".to_string(),
        last_modified_by_type: "User".to_string(),
    }
}

#[tokio::test]
async fn a_deploy_work_item_is_carried_to_success() {
    let resource_id = ResourceId::parse(
        "/planes/radius/local/resourceGroups/g/providers/Applications.Core/httpRoutes/front",
    )
    .unwrap();

    let store: Arc<dyn ResourceStore<Value>> = Arc::new(MemoryStore::<Value>::new());
    store
        .save(
            TrackedResource {
                id: resource_id.clone(),
                name: "front".to_string(),
                resource_type: "Applications.Core/httpRoutes".to_string(),
                system_data: system_data(),
                provisioning_state: ProvisioningState::Accepted,
                output_resources: vec![],
                properties: json!({}),
            },
            None,
        )
        .await
        .unwrap();

    let mut renderers = RendererRegistry::new();
    renderers.register(Box::new(RouteRenderer));

    let operations = Arc::new(MemoryOperationTracker::default());
    let started = operations.start(resource_id.clone()).await.unwrap();

    let queue = Arc::new(MemoryQueue::<WorkItem>::new(5));
    queue
        .enqueue(WorkItem {
            resource_id: resource_id.clone(),
            operation_id: started.id.clone(),
            kind: WorkKind::Deploy,
        })
        .await
        .unwrap();

    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let visibility_timeout = Duration::from_secs(30);
    let receiver = start_dequeuer(
        queue.clone(),
        visibility_timeout,
        Duration::from_millis(10),
        shutdown_rx,
    );

    let deployer = Arc::new(Deployer {
        store: store.clone(),
        renderers: Arc::new(renderers),
        processor: Arc::new(DeploymentProcessor::new(HandlerRegistry::new())),
        operations: operations.clone(),
    });

    let _workers = radius_worker::pool::spawn(1, receiver, queue.clone(), deployer, visibility_timeout);

    let mut status = operations.get(&started.id).await.unwrap();
    for _ in 0..200 {
        if status.status.is_terminal() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        status = operations.get(&started.id).await.unwrap();
    }

    assert_eq!(status.status, ProvisioningState::Succeeded);
    let (resource, _etag) = store.get(&resource_id).await.unwrap();
    assert_eq!(resource.provisioning_state, ProvisioningState::Succeeded);
}
