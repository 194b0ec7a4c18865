use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    error::Result,
    model::{ETag, ResourceId, TrackedResource},
};

/// A page of query results plus an opaque continuation token.
///
/// The token, when present, is passed back to [`ResourceStore::query`] to fetch the next
/// page; results are a consistent snapshot per page but not across pages.
pub struct Page<P> {
    pub items: Vec<TrackedResource<P>>,
    pub next_token: Option<String>,
}

/// Versioned persistence for typed resources with optimistic concurrency.
///
/// Implementations must be linearizable for single-key reads/writes. Two backends
/// exist: an embedded in-memory engine ([`crate::memory::MemoryStore`]) and, behind the
/// `kubernetes` feature, a Kubernetes CRD-backed engine. Both implement this same trait so
/// the rest of the runtime is agnostic to which one is configured.
#[async_trait]
pub trait ResourceStore<P>: Send + Sync
where
    P: Serialize + DeserializeOwned + Send + Sync + Clone + 'static,
{
    /// Persists `resource`. If `if_match` is `Some`, the write only succeeds when the
    /// stored etag still matches; a `None` write only succeeds if no resource exists yet.
    async fn save(
        &self,
        resource: TrackedResource<P>,
        if_match: Option<&ETag>,
    ) -> Result<ETag>;

    async fn get(&self, id: &ResourceId) -> Result<(TrackedResource<P>, ETag)>;

    /// Deletes the resource at `id`. If `if_match` is `Some`, the delete only succeeds
    /// when the stored etag still matches.
    async fn delete(&self, id: &ResourceId, if_match: Option<&ETag>) -> Result<()>;

    /// Lists resources of `resource_type` under `root_scope`, most-recently-created first.
    async fn query(
        &self,
        root_scope: &str,
        resource_type: &str,
        continuation_token: Option<&str>,
        max_items: usize,
    ) -> Result<Page<P>>;
}
