use async_trait::async_trait;

use crate::{
    error::Result,
    model::{Secret, SecretVersion},
};

/// Versioned persistence for [`Secret`]s, mirroring [`radius_store::ResourceStore`]'s
/// optimistic-concurrency contract but narrowed to a scope+name key rather than a full ARM id.
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn save(&self, secret: Secret, if_match: Option<&SecretVersion>) -> Result<SecretVersion>;

    async fn get(&self, scope: &str, name: &str) -> Result<(Secret, SecretVersion)>;

    async fn delete(&self, scope: &str, name: &str, if_match: Option<&SecretVersion>) -> Result<()>;

    /// Lists every secret directly under `scope`.
    async fn list(&self, scope: &str) -> Result<Vec<Secret>>;
}
