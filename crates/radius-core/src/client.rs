//! A thin wrapper around [`kube::Client`] used throughout the control plane to obtain
//! namespaced or cluster-wide [`Api`] handles without repeating the same boilerplate at
//! every call site.

use kube::{Api, Client as KubeClient, Resource};

/// Wraps an underlying [`kube::Client`] and provides convenience constructors for
/// [`kube::Api`] handles.
///
/// The wrapped client is cheap to clone (it is itself an `Arc` internally), so `Client`
/// derives `Clone` and can be freely passed around and stored in long-lived tasks such as
/// the worker pool or the async-operation tracker.
#[derive(Clone)]
pub struct Client {
    client: KubeClient,
}

impl Client {
    pub fn new(client: KubeClient) -> Self {
        Client { client }
    }

    /// Returns the underlying [`kube::Client`] for use cases not covered by this wrapper.
    pub fn as_kube_client(&self) -> KubeClient {
        self.client.clone()
    }

    /// Returns an [`Api`] scoped to a single namespace.
    pub fn get_api<T>(&self, namespace: &str) -> Api<T>
    where
        T: Resource<DynamicType = (), Scope = k8s_openapi::NamespaceResourceScope>,
    {
        Api::namespaced(self.client.clone(), namespace)
    }

    /// Returns an [`Api`] that spans all namespaces the client has RBAC access to.
    pub fn get_all_api<T>(&self) -> Api<T>
    where
        T: Resource<DynamicType = (), Scope = k8s_openapi::NamespaceResourceScope>,
    {
        Api::all(self.client.clone())
    }
}
