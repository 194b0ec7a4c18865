//! Resource CRUD and operation-status endpoints.
//!
//! Mutating requests (`PUT`/`DELETE`) are always asynchronous: they persist the resource's
//! `Accepted`/`Deleting` state synchronously, hand the actual work off to the queue (B), and
//! return `202 Accepted` with `Location`/`Azure-AsyncOperation` headers pointing at the
//! operation-status endpoint, the same contract ARM clients already know how to poll.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderName, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use radius_async_ops::OperationId;
use radius_store::{ProvisioningState, ResourceId, SystemData, TrackedResource};
use radius_worker::{WorkItem, WorkKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use snafu::ResultExt as _;

use crate::{
    error::{MalformedResourceIdSnafu, OperationSnafu, QueueSnafu, Result, StoreSnafu},
    state::ApiState,
};

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/resources", get(list_resources))
        .route(
            "/resources/{*resource_id}",
            get(get_resource).put(create_or_update).delete(delete_resource),
        )
        .route("/operationstatuses/{operation_id}", get(get_operation_status))
        .layer(radius_telemetry::AxumTraceLayer::new())
        .with_state(state)
}

fn parse_id(raw: &str) -> Result<ResourceId> {
    ResourceId::parse(format!("/{raw}")).map_err(|_| {
        MalformedResourceIdSnafu {
            id: raw.to_string(),
        }
        .build()
    })
}

fn accepted(operation_id: &OperationId) -> Response {
    let location = format!("/operationstatuses/{operation_id}");
    (
        StatusCode::ACCEPTED,
        [
            (header::LOCATION, location.clone()),
            (HeaderName::from_static("azure-asyncoperation"), location),
        ],
    )
        .into_response()
}

async fn get_resource(
    State(state): State<ApiState>,
    Path(resource_id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&resource_id)?;
    let (resource, etag) = state.store.get(&id).await.context(StoreSnafu)?;
    Ok((
        [(header::ETAG, etag.as_str().to_string())],
        Json(resource),
    ))
}

async fn create_or_update(
    State(state): State<ApiState>,
    Path(resource_id): Path<String>,
    Json(properties): Json<Value>,
) -> Result<Response> {
    let id = parse_id(&resource_id)?;
    let existing = state.store.get(&id).await.ok();

    let now = chrono::Utc::now().to_rfc3339();
    let system_data = match &existing {
        Some((resource, _)) => SystemData {
            created_at: resource.system_data.created_at.clone(),
            created_by: resource.system_data.created_by.clone(),
            created_by_type: resource.system_data.created_by_type.clone(),
            last_modified_at: now.clone(),
            last_modified_by: "radius-rp".to_string(),
            last_modified_by_type: "Application".to_string(),
        },
        None => SystemData {
            created_at: now.clone(),
            created_by: "radius-rp".to_string(),
            created_by_type: "Application".to_string(),
            last_modified_at: now,
            last_modified_by: "radius-rp".to_string(),
            last_modified_by_type: "Application".to_string(),
        },
    };

    let if_match = existing.as_ref().map(|(_, etag)| etag.clone());
    let output_resources = existing
        .map(|(resource, _)| resource.output_resources)
        .unwrap_or_default();

    let resource = TrackedResource {
        id: id.clone(),
        name: id.name().to_string(),
        resource_type: id.resource_type().to_string(),
        system_data,
        provisioning_state: ProvisioningState::Accepted,
        output_resources,
        properties,
    };

    state
        .store
        .save(resource, if_match.as_ref())
        .await
        .context(StoreSnafu)?;

    let operation = state.operations.start(id.clone()).await.context(OperationSnafu)?;
    state
        .queue
        .enqueue(WorkItem {
            resource_id: id,
            operation_id: operation.id.clone(),
            kind: WorkKind::Deploy,
        })
        .await
        .context(QueueSnafu)?;

    Ok(accepted(&operation.id))
}

async fn delete_resource(
    State(state): State<ApiState>,
    Path(resource_id): Path<String>,
) -> Result<Response> {
    let id = parse_id(&resource_id)?;
    state.store.get(&id).await.context(StoreSnafu)?;

    let operation = state.operations.start(id.clone()).await.context(OperationSnafu)?;
    state
        .queue
        .enqueue(WorkItem {
            resource_id: id,
            operation_id: operation.id.clone(),
            kind: WorkKind::Delete,
        })
        .await
        .context(QueueSnafu)?;

    Ok(accepted(&operation.id))
}

async fn get_operation_status(
    State(state): State<ApiState>,
    Path(operation_id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = OperationId::new(operation_id);
    let status = state.operations.get(&id).await.context(OperationSnafu)?;
    Ok(Json(status))
}

fn default_max_items() -> usize {
    20
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    root_scope: String,
    resource_type: String,
    continuation_token: Option<String>,
    #[serde(default = "default_max_items")]
    max_items: usize,
}

#[derive(Serialize)]
struct PageResponse {
    value: Vec<TrackedResource<Value>>,
    next_link: Option<String>,
}

async fn list_resources(
    State(state): State<ApiState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse> {
    let page = state
        .store
        .query(
            &query.root_scope,
            &query.resource_type,
            query.continuation_token.as_deref(),
            query.max_items,
        )
        .await
        .context(StoreSnafu)?;

    let next_link = page.next_token.map(|token| {
        format!(
            "/resources?rootScope={}&resourceType={}&continuationToken={token}",
            query.root_scope, query.resource_type
        )
    });

    Ok(Json(PageResponse {
        value: page.items,
        next_link,
    }))
}
