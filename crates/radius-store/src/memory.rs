//! An embedded, in-process [`ResourceStore`] backed by an ordered map.
//!
//! Used as the `storageProvider: inmemory` backend and in tests for every crate that
//! consumes a [`ResourceStore`]; it is not durable across process restarts.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Serialize, de::DeserializeOwned};
use snafu::OptionExt as _;
use tokio::sync::RwLock;

use crate::{
    error::{ConcurrencySnafu, NotFoundSnafu, Result},
    model::{ETag, ResourceId, TrackedResource},
    store::{Page, ResourceStore},
};

struct Entry<P> {
    resource: TrackedResource<P>,
    version: u64,
}

/// An embedded, ordered-map-backed [`ResourceStore`].
///
/// Keys are the resource id's string form, so iteration order (used by [`Self::query`] to
/// page deterministically) is insertion order unless a resource is re-saved, which keeps its
/// original position.
pub struct MemoryStore<P> {
    entries: RwLock<IndexMap<String, Entry<P>>>,
}

impl<P> Default for MemoryStore<P> {
    fn default() -> Self {
        MemoryStore {
            entries: RwLock::new(IndexMap::new()),
        }
    }
}

impl<P> MemoryStore<P> {
    pub fn new() -> Self {
        Self::default()
    }
}

fn etag_for(version: u64) -> ETag {
    ETag::new(version.to_string())
}

#[async_trait]
impl<P> ResourceStore<P> for MemoryStore<P>
where
    P: Serialize + DeserializeOwned + Send + Sync + Clone + 'static,
{
    async fn save(&self, resource: TrackedResource<P>, if_match: Option<&ETag>) -> Result<ETag> {
        let key = resource.id.as_str().to_string();
        let mut entries = self.entries.write().await;

        let next_version = match (entries.get(&key), if_match) {
            (Some(existing), Some(expected)) if etag_for(existing.version) == *expected => {
                existing.version + 1
            }
            (Some(existing), Some(_)) => {
                return ConcurrencySnafu {
                    id: existing.resource.id.clone(),
                }
                .fail();
            }
            (Some(_), None) => {
                return ConcurrencySnafu {
                    id: resource.id.clone(),
                }
                .fail();
            }
            (None, _) => 1,
        };

        let new_etag = etag_for(next_version);
        entries.insert(
            key,
            Entry {
                resource,
                version: next_version,
            },
        );
        Ok(new_etag)
    }

    async fn get(&self, id: &ResourceId) -> Result<(TrackedResource<P>, ETag)> {
        let entries = self.entries.read().await;
        let entry = entries
            .get(id.as_str())
            .context(NotFoundSnafu { id: id.clone() })?;
        Ok((entry.resource.clone(), etag_for(entry.version)))
    }

    async fn delete(&self, id: &ResourceId, if_match: Option<&ETag>) -> Result<()> {
        let mut entries = self.entries.write().await;
        let Some(entry) = entries.get(id.as_str()) else {
            return Ok(());
        };
        if let Some(expected) = if_match {
            if etag_for(entry.version) != *expected {
                return ConcurrencySnafu { id: id.clone() }.fail();
            }
        }
        entries.shift_remove(id.as_str());
        Ok(())
    }

    async fn query(
        &self,
        root_scope: &str,
        resource_type: &str,
        continuation_token: Option<&str>,
        max_items: usize,
    ) -> Result<Page<P>> {
        let entries = self.entries.read().await;
        let skip: usize = continuation_token
            .and_then(|t| t.parse().ok())
            .unwrap_or(0);

        // Take one extra item so we can tell whether another page follows without
        // comparing the page length to `max_items`, which is wrong on an exact boundary.
        let mut matching: Vec<_> = entries
            .values()
            .filter(|entry| {
                entry.resource.id.as_str().contains(root_scope)
                    && entry.resource.resource_type.eq_ignore_ascii_case(resource_type)
            })
            .skip(skip)
            .take(max_items + 1)
            .map(|entry| entry.resource.clone())
            .collect();

        let next_token = if matching.len() > max_items {
            matching.truncate(max_items);
            Some((skip + max_items).to_string())
        } else {
            None
        };

        Ok(Page {
            items: matching,
            next_token,
        })
    }
}
