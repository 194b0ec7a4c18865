//! Output resource handlers (component K): the connectors a deployment processor dispatches
//! to once a renderer has produced output resources to apply or tear down.

pub mod kubernetes;

use k8s_openapi::api::{apps::v1::Deployment, core::v1::Service};
use radius_core::client::Client;
use radius_processor::HandlerRegistry;

pub use kubernetes::KubernetesHandler;

/// Registers every handler this crate ships for the Kubernetes-backed output resource kinds a
/// renderer can produce (`kubernetes.apps.deployment`, `kubernetes.core.service`).
pub fn register_kubernetes_handlers(registry: &mut HandlerRegistry, client: Client) {
    registry.register(Box::new(KubernetesHandler::<Deployment>::new(
        "kubernetes.apps.deployment",
        client.clone(),
    )));
    registry.register(Box::new(KubernetesHandler::<Service>::new(
        "kubernetes.core.service",
        client,
    )));
}
