//! An embedded, in-process [`AsyncOperationTracker`], not durable across process restarts.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use indexmap::IndexMap;
use radius_store::{ProvisioningState, ResourceId};
use snafu::{OptionExt as _, ensure};
use tokio::sync::RwLock;

use crate::{
    error::{AlreadyTerminalSnafu, NotFoundSnafu, NotTerminalSnafu, Result},
    model::{OperationError, OperationId, OperationStatus},
    tracker::AsyncOperationTracker,
};

#[derive(Default)]
pub struct MemoryOperationTracker {
    operations: RwLock<IndexMap<String, OperationStatus>>,
    next_id: AtomicU64,
}

impl MemoryOperationTracker {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AsyncOperationTracker for MemoryOperationTracker {
    async fn start(&self, resource_id: ResourceId) -> Result<OperationStatus> {
        let id = OperationId::new(self.next_id.fetch_add(1, Ordering::Relaxed).to_string());
        let status = OperationStatus {
            id: id.clone(),
            resource_id,
            status: ProvisioningState::Accepted,
            started_at: Utc::now().to_rfc3339(),
            ended_at: None,
            percent_complete: 0,
            error: None,
        };

        self.operations
            .write()
            .await
            .insert(id.as_str().to_string(), status.clone());
        Ok(status)
    }

    async fn update_progress(&self, id: &OperationId, percent_complete: u8) -> Result<()> {
        let mut operations = self.operations.write().await;
        let operation = operations
            .get_mut(id.as_str())
            .context(NotFoundSnafu { id: id.clone() })?;
        ensure!(
            !operation.status.is_terminal(),
            AlreadyTerminalSnafu { id: id.clone() }
        );
        operation.percent_complete = percent_complete;
        Ok(())
    }

    async fn complete(
        &self,
        id: &OperationId,
        status: ProvisioningState,
        error: Option<OperationError>,
    ) -> Result<()> {
        ensure!(status.is_terminal(), NotTerminalSnafu { id: id.clone() });

        let mut operations = self.operations.write().await;
        let operation = operations
            .get_mut(id.as_str())
            .context(NotFoundSnafu { id: id.clone() })?;
        ensure!(
            !operation.status.is_terminal(),
            AlreadyTerminalSnafu { id: id.clone() }
        );

        operation.status = status;
        operation.percent_complete = 100;
        operation.ended_at = Some(Utc::now().to_rfc3339());
        operation.error = error;
        Ok(())
    }

    async fn get(&self, id: &OperationId) -> Result<OperationStatus> {
        self.operations
            .read()
            .await
            .get(id.as_str())
            .cloned()
            .context(NotFoundSnafu { id: id.clone() })
    }
}
