//! Types persisted by the resource store: resource identifiers, the tracked-resource
//! envelope, and the output-resource records it owns.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use snafu::Snafu;

pub type Result<T, E = IdParseError> = std::result::Result<T, E>;

/// A slash-delimited ARM-style resource identifier, e.g.
/// `/planes/radius/local/resourceGroups/my-group/providers/Applications.Core/containers/front`.
///
/// Identifiers are matched case-insensitively but preserved as given.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ResourceId(String);

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum IdParseError {
    #[snafu(display("resource id must start with a leading '/'"))]
    MissingLeadingSlash,

    #[snafu(display("resource id must have at least a plane, root scope, provider, type and name segment"))]
    TooFewSegments,
}

impl ResourceId {
    pub fn parse(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if !id.starts_with('/') {
            return MissingLeadingSlashSnafu.fail();
        }
        if id.trim_matches('/').split('/').count() < 5 {
            return TooFewSegmentsSnafu.fail();
        }
        Ok(ResourceId(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the plane the resource lives in (e.g. `radius`, `azure`, `aws`, `kubernetes`).
    ///
    /// Assumes a well-formed id of the shape `/planes/{plane}/...`; callers should only
    /// construct `ResourceId` through [`ResourceId::parse`], which validates the segment count.
    pub fn plane(&self) -> &str {
        self.segment(1)
    }

    /// Returns the leaf resource type's trailing segment, e.g. `containers` for a container id.
    pub fn resource_type(&self) -> &str {
        let segments: Vec<&str> = self.0.trim_matches('/').split('/').collect();
        segments[segments.len() - 2]
    }

    /// Returns the leaf resource name, the final path segment.
    pub fn name(&self) -> &str {
        let segments: Vec<&str> = self.0.trim_matches('/').split('/').collect();
        segments[segments.len() - 1]
    }

    fn segment(&self, index: usize) -> &str {
        self.0
            .trim_matches('/')
            .split('/')
            .nth(index)
            .unwrap_or_default()
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An opaque, per-record version used for optimistic concurrency.
///
/// Changes on every persisted write. Store backends are free to choose their own
/// internal representation (a monotonic counter, a Kubernetes `resourceVersion`, ...); this
/// type only guarantees equality comparison and serialization round-tripping.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ETag(String);

impl ETag {
    pub fn new(value: impl Into<String>) -> Self {
        ETag(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize, JsonSchema, strum::Display)]
#[serde(rename_all = "PascalCase")]
#[strum(serialize_all = "PascalCase")]
pub enum ProvisioningState {
    Accepted,
    Updating,
    Deleting,
    Succeeded,
    Failed,
    Canceled,
}

impl ProvisioningState {
    /// Terminal states are the only ones a worker may transition a resource into.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ProvisioningState::Succeeded | ProvisioningState::Failed | ProvisioningState::Canceled
        )
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct SystemData {
    /// RFC 3339 timestamp, immutable after creation.
    pub created_at: String,
    pub created_by: String,
    pub created_by_type: String,
    /// RFC 3339 timestamp, updated on every mutation.
    pub last_modified_at: String,
    pub last_modified_by: String,
    pub last_modified_by_type: String,
}

/// The platform-provider namespace an output resource was created through.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize, JsonSchema, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OutputResourceProvider {
    Kubernetes,
    Azure,
    Aws,
    Radius,
}

/// A single platform artefact (a `Deployment`, a Dapr component CR, a cloud resource, ...)
/// owned by exactly one tracked resource.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct OutputResource {
    /// Unique within the owning tracked resource, stable across updates.
    pub local_id: String,
    pub kind: String,
    pub provider: OutputResourceProvider,
    /// The platform-specific identity (a Kubernetes GVK+name, a cloud resource id, ...).
    pub identity: String,
    /// Opaque properties the handler needs to reconstruct or delete the artefact.
    pub persisted_properties: serde_json::Map<String, serde_json::Value>,
    /// `local_id`s of output resources this one depends on, used by the deployment
    /// processor to compute apply/delete order.
    pub dependencies: Vec<String>,
}

/// The envelope persisted by the resource store for every Radius resource.
///
/// `P` is the resource-type-specific properties payload; the store treats it opaquely
/// (it is only inspected by renderers and handlers upstream of this crate).
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct TrackedResource<P> {
    pub id: ResourceId,
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub system_data: SystemData,
    pub provisioning_state: ProvisioningState,
    pub output_resources: Vec<OutputResource>,
    pub properties: P,
}

impl<P> TrackedResource<P> {
    /// A resource in a non-terminal state rejects further mutating requests; see
    /// [`ProvisioningState::is_terminal`].
    pub fn is_mutable(&self) -> bool {
        self.provisioning_state.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_id() {
        let id = ResourceId::parse(
            "/planes/radius/local/resourceGroups/g/providers/Applications.Core/containers/front",
        )
        .unwrap();
        assert_eq!(id.plane(), "radius");
        assert_eq!(id.resource_type(), "containers");
        assert_eq!(id.name(), "front");
    }

    #[test]
    fn rejects_relative_id() {
        assert_eq!(
            ResourceId::parse("planes/radius/local/providers/x/y"),
            Err(IdParseError::MissingLeadingSlash)
        );
    }

    #[test]
    fn rejects_short_id() {
        assert_eq!(
            ResourceId::parse("/planes/radius"),
            Err(IdParseError::TooFewSegments)
        );
    }

    #[test]
    fn terminal_states() {
        assert!(ProvisioningState::Succeeded.is_terminal());
        assert!(ProvisioningState::Failed.is_terminal());
        assert!(ProvisioningState::Canceled.is_terminal());
        assert!(!ProvisioningState::Accepted.is_terminal());
        assert!(!ProvisioningState::Updating.is_terminal());
        assert!(!ProvisioningState::Deleting.is_terminal());
    }
}
