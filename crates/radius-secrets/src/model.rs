//! Types persisted by the secret store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An opaque, per-record version used for optimistic concurrency, mirroring
/// [`radius_store::ETag`] but kept local so this crate has no dependency on the resource
/// store's identity scheme.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretVersion(String);

impl SecretVersion {
    pub fn new(value: impl Into<String>) -> Self {
        SecretVersion(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SecretVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named bag of key/value secret data, scoped under a root scope (typically the owning
/// resource group's ARM id).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Secret {
    pub name: String,
    pub scope: String,
    pub data: BTreeMap<String, String>,
}
