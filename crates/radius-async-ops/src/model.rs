//! The record a client polls (`Azure-AsyncOperation`/`operationStatuses`) while a long-running
//! ARM request is in flight.

use radius_store::{ProvisioningState, ResourceId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationId(String);

impl OperationId {
    pub fn new(value: impl Into<String>) -> Self {
        OperationId(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OperationError {
    pub code: String,
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OperationStatus {
    pub id: OperationId,
    pub resource_id: ResourceId,
    pub status: ProvisioningState,
    /// RFC 3339 timestamp, set when the operation is first recorded.
    pub started_at: String,
    /// RFC 3339 timestamp, set exactly once, when [`ProvisioningState::is_terminal`] becomes true.
    pub ended_at: Option<String>,
    pub percent_complete: u8,
    pub error: Option<OperationError>,
}
