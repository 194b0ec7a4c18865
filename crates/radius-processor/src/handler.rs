//! The seam between the deployment processor and the platform-specific connectors
//! (component K) that actually create, update, and delete output resources.

use async_trait::async_trait;
use indexmap::IndexMap;
use radius_store::OutputResource;
use serde_json::Map;

use crate::error::{Result, UnknownHandlerSnafu};
use snafu::OptionExt as _;

/// The result of successfully applying an output resource: the properties the handler
/// discovered after creating or updating it (e.g. a generated IP, a cloud provider's resource
/// id), merged back into the tracked resource's output resource record.
#[derive(Debug, Clone, Default)]
pub struct PutResult {
    pub persisted_properties: Map<String, serde_json::Value>,
}

/// Implemented once per output resource `kind` (`kubernetes.apps.deployment`, a Dapr
/// component CRD, a cloud resource manager call, a recipe driver invocation, ...).
///
/// Handler failures distinguish transient from permanent via
/// [`crate::error::Error::HandlerTransient`] / [`crate::error::Error::HandlerPermanent`]; the
/// processor does not interpret handler errors itself, it only propagates them.
#[async_trait]
pub trait OutputResourceHandler: Send + Sync {
    /// The output resource `kind` this handler applies, e.g. `kubernetes.apps.deployment`.
    fn kind(&self) -> &str;

    /// Creates the output resource if absent, otherwise updates it to match.
    async fn put(&self, resource: &OutputResource) -> Result<PutResult>;

    /// Deletes the output resource. Must succeed (not error) if the resource is already gone.
    async fn delete(&self, resource: &OutputResource) -> Result<()>;
}

/// Looks up the handler registered for an output resource's `kind`.
///
/// Equivalent to a controller's scheme registration: every kind a renderer can produce must
/// have exactly one handler registered here before a deployment referencing it is processed.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: IndexMap<String, Box<dyn OutputResourceHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Box<dyn OutputResourceHandler>) {
        self.handlers.insert(handler.kind().to_string(), handler);
    }

    pub fn handler_for(&self, kind: &str) -> Result<&dyn OutputResourceHandler> {
        self.handlers
            .get(kind)
            .map(Box::as_ref)
            .context(UnknownHandlerSnafu { kind })
    }
}
