//! An embedded, in-process [`SecretStore`], not durable across process restarts.

use async_trait::async_trait;
use indexmap::IndexMap;
use snafu::OptionExt as _;
use tokio::sync::RwLock;

use crate::{
    error::{ConcurrencySnafu, NotFoundSnafu, Result},
    model::{Secret, SecretVersion},
    store::SecretStore,
};

struct Entry {
    secret: Secret,
    version: u64,
}

#[derive(Default)]
pub struct MemorySecretStore {
    entries: RwLock<IndexMap<(String, String), Entry>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn version_for(version: u64) -> SecretVersion {
    SecretVersion::new(version.to_string())
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn save(&self, secret: Secret, if_match: Option<&SecretVersion>) -> Result<SecretVersion> {
        let key = (secret.scope.clone(), secret.name.clone());
        let mut entries = self.entries.write().await;

        let next_version = match (entries.get(&key), if_match) {
            (Some(existing), Some(expected)) if version_for(existing.version) == *expected => {
                existing.version + 1
            }
            (Some(_), Some(_)) | (Some(_), None) => {
                return ConcurrencySnafu {
                    scope: secret.scope,
                    name: secret.name,
                }
                .fail();
            }
            (None, _) => 1,
        };

        let version = version_for(next_version);
        entries.insert(
            key,
            Entry {
                secret,
                version: next_version,
            },
        );
        Ok(version)
    }

    async fn get(&self, scope: &str, name: &str) -> Result<(Secret, SecretVersion)> {
        let entries = self.entries.read().await;
        let entry = entries
            .get(&(scope.to_string(), name.to_string()))
            .context(NotFoundSnafu {
                scope: scope.to_string(),
                name: name.to_string(),
            })?;
        Ok((entry.secret.clone(), version_for(entry.version)))
    }

    async fn delete(&self, scope: &str, name: &str, if_match: Option<&SecretVersion>) -> Result<()> {
        let key = (scope.to_string(), name.to_string());
        let mut entries = self.entries.write().await;
        let Some(entry) = entries.get(&key) else {
            return Ok(());
        };
        if let Some(expected) = if_match {
            if version_for(entry.version) != *expected {
                return ConcurrencySnafu {
                    scope: scope.to_string(),
                    name: name.to_string(),
                }
                .fail();
            }
        }
        entries.shift_remove(&key);
        Ok(())
    }

    async fn list(&self, scope: &str) -> Result<Vec<Secret>> {
        let entries = self.entries.read().await;
        Ok(entries
            .values()
            .filter(|entry| entry.secret.scope == scope)
            .map(|entry| entry.secret.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn secret(scope: &str, name: &str) -> Secret {
        Secret {
            name: name.to_string(),
            scope: scope.to_string(),
            data: BTreeMap::from([("connectionString".to_string(), "Endpoint=...".to_string())]),
        }
    }

    #[tokio::test]
    async fn save_then_get_round_trips() {
        let store = MemorySecretStore::new();
        store.save(secret("g", "servicebus"), None).await.unwrap();

        let (fetched, _) = store.get("g", "servicebus").await.unwrap();
        assert_eq!(
            fetched.data.get("connectionString").unwrap(),
            "Endpoint=..."
        );
    }

    #[tokio::test]
    async fn stale_version_conflicts_on_save() {
        let store = MemorySecretStore::new();
        store.save(secret("g", "servicebus"), None).await.unwrap();

        let stale = SecretVersion::new("0");
        let err = store
            .save(secret("g", "servicebus"), Some(&stale))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::Error::Concurrency { .. }));
    }

    #[tokio::test]
    async fn list_is_scoped() {
        let store = MemorySecretStore::new();
        store.save(secret("g1", "a"), None).await.unwrap();
        store.save(secret("g2", "b"), None).await.unwrap();

        let listed = store.list("g1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "a");
    }
}
