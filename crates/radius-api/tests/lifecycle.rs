//! Exercises the ARM request pipeline end-to-end against in-memory backends: create, poll the
//! resulting operation id, read back the resource, then delete it.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use radius_api::{ApiState, build_router};
use radius_async_ops::MemoryOperationTracker;
use radius_queue::MemoryQueue;
use radius_store::MemoryStore;
use radius_worker::WorkItem;
use serde_json::{Value, json};
use tower::ServiceExt as _;

fn state() -> ApiState {
    ApiState {
        store: Arc::new(MemoryStore::<Value>::new()),
        queue: Arc::new(MemoryQueue::<WorkItem>::new(5)),
        operations: Arc::new(MemoryOperationTracker::new()),
    }
}

const RESOURCE_ID: &str =
    "planes/radius/local/resourceGroups/demo/providers/Applications.Core/containers/front";

#[tokio::test]
async fn create_then_poll_then_read_round_trips() {
    let router = build_router(state());

    let create = Request::builder()
        .method("PUT")
        .uri(format!("/resources/{RESOURCE_ID}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"image": "nginx"}).to_string()))
        .unwrap();
    let response = router.clone().oneshot(create).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(location.starts_with("/operationstatuses/"));

    let poll = Request::builder()
        .uri(&location)
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(poll).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let read = Request::builder()
        .uri(format!("/resources/{RESOURCE_ID}"))
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(read).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(header::ETAG));
}

#[tokio::test]
async fn reading_an_unknown_resource_returns_a_not_found_envelope() {
    let router = build_router(state());

    let request = Request::builder()
        .uri(format!("/resources/{RESOURCE_ID}"))
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_an_unknown_resource_returns_a_not_found_envelope() {
    let router = build_router(state());

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/resources/{RESOURCE_ID}"))
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_of_an_existing_resource_is_accepted() {
    let router = build_router(state());

    let create = Request::builder()
        .method("PUT")
        .uri(format!("/resources/{RESOURCE_ID}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"image": "nginx"}).to_string()))
        .unwrap();
    router.clone().oneshot(create).await.unwrap();

    let delete = Request::builder()
        .method("DELETE")
        .uri(format!("/resources/{RESOURCE_ID}"))
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(delete).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn a_malformed_resource_id_is_rejected_as_a_bad_request() {
    let router = build_router(state());

    let request = Request::builder()
        .uri("/resources/not-a-valid-id")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_resources_paginates() {
    let router = build_router(state());

    for name in ["a", "b", "c"] {
        let id = format!(
            "planes/radius/local/resourceGroups/demo/providers/Applications.Core/containers/{name}"
        );
        let create = Request::builder()
            .method("PUT")
            .uri(format!("/resources/{id}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({"image": "nginx"}).to_string()))
            .unwrap();
        router.clone().oneshot(create).await.unwrap();
    }

    let request = Request::builder()
        .uri("/resources?rootScope=demo&resourceType=containers&maxItems=2")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
