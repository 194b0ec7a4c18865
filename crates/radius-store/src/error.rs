use snafu::Snafu;

use crate::model::ResourceId;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("resource {id} was not found"))]
    NotFound { id: ResourceId },

    #[snafu(display("resource {id} was modified concurrently, etag mismatch"))]
    Concurrency { id: ResourceId },

    #[snafu(display("failed to serialize resource {id}"))]
    Serialize {
        id: ResourceId,
        source: serde_json::Error,
    },

    #[snafu(display("failed to deserialize resource {id}"))]
    Deserialize {
        id: ResourceId,
        source: serde_json::Error,
    },

    #[cfg(feature = "kubernetes")]
    #[snafu(display("Kubernetes API request for {id} failed"))]
    Kubernetes {
        id: ResourceId,
        source: kube::Error,
    },

    #[cfg(feature = "kubernetes")]
    #[snafu(display("Kubernetes list request failed"))]
    KubernetesQuery { source: kube::Error },
}

impl Error {
    /// Whether this error corresponds to a simple "does not exist" condition, as opposed to a
    /// genuine failure; callers performing a delete typically want to treat this as success.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
