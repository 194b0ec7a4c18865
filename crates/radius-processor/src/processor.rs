//! The deployment processor (component H): orders a deployment's output resources by
//! dependency, applies them through their registered handlers, and tears them down in
//! reverse order on delete.

use radius_store::OutputResource;
use tracing::{info, instrument};

use crate::{
    error::Result,
    graph::topological_order,
    handler::HandlerRegistry,
};

pub struct DeploymentProcessor {
    handlers: HandlerRegistry,
}

impl DeploymentProcessor {
    pub fn new(handlers: HandlerRegistry) -> Self {
        Self { handlers }
    }

    /// Applies every output resource in dependency order, returning the updated records with
    /// each handler's discovered properties merged in.
    ///
    /// If a handler fails, resources already applied are left in place; the caller (the
    /// worker) is expected to retry the whole deployment, which re-applies already-applied
    /// resources idempotently rather than attempting to resume mid-graph.
    #[instrument(skip_all)]
    pub async fn deploy(&self, output_resources: &[OutputResource]) -> Result<Vec<OutputResource>> {
        let order = topological_order(output_resources)?;
        let mut by_local_id: std::collections::HashMap<&str, OutputResource> = output_resources
            .iter()
            .map(|r| (r.local_id.as_str(), r.clone()))
            .collect();
        let mut applied = Vec::with_capacity(output_resources.len());

        for local_id in order {
            let mut resource = by_local_id.remove(local_id.as_str()).expect("local_id came from these resources");
            let handler = self.handlers.handler_for(&resource.kind)?;
            info!(local_id = %resource.local_id, kind = %resource.kind, "applying output resource");
            let result = handler.put(&resource).await?;
            resource.persisted_properties = result.persisted_properties;
            applied.push(resource);
        }

        Ok(applied)
    }

    /// Deletes every output resource in reverse dependency order (dependents before their
    /// dependencies). Handlers must treat deleting an already-absent resource as success, so a
    /// retried delete after a partial failure is safe.
    #[instrument(skip_all)]
    pub async fn delete(&self, output_resources: &[OutputResource]) -> Result<()> {
        let mut order = topological_order(output_resources)?;
        order.reverse();
        let by_local_id: std::collections::HashMap<&str, &OutputResource> = output_resources
            .iter()
            .map(|r| (r.local_id.as_str(), r))
            .collect();

        for local_id in order {
            let resource = by_local_id[local_id.as_str()];
            let handler = self.handlers.handler_for(&resource.kind)?;
            info!(local_id = %resource.local_id, kind = %resource.kind, "deleting output resource");
            handler.delete(resource).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use radius_store::model::OutputResourceProvider;

    use super::*;
    use crate::handler::{OutputResourceHandler, PutResult};

    struct RecordingHandler {
        kind: String,
        applied: Arc<Mutex<Vec<String>>>,
        deleted: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl OutputResourceHandler for RecordingHandler {
        fn kind(&self) -> &str {
            &self.kind
        }

        async fn put(&self, resource: &OutputResource) -> Result<PutResult> {
            self.applied.lock().unwrap().push(resource.local_id.clone());
            Ok(PutResult::default())
        }

        async fn delete(&self, resource: &OutputResource) -> Result<()> {
            self.deleted.lock().unwrap().push(resource.local_id.clone());
            Ok(())
        }
    }

    fn resource(local_id: &str, kind: &str, dependencies: &[&str]) -> OutputResource {
        OutputResource {
            local_id: local_id.to_string(),
            kind: kind.to_string(),
            provider: OutputResourceProvider::Kubernetes,
            identity: local_id.to_string(),
            persisted_properties: serde_json::Map::new(),
            dependencies: dependencies.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn deploy_applies_dependencies_before_dependents() {
        let applied = Arc::new(Mutex::new(Vec::new()));
        let deleted = Arc::new(Mutex::new(Vec::new()));
        let mut handlers = HandlerRegistry::new();
        handlers.register(Box::new(RecordingHandler {
            kind: "deployment".to_string(),
            applied: applied.clone(),
            deleted: deleted.clone(),
        }));
        handlers.register(Box::new(RecordingHandler {
            kind: "service".to_string(),
            applied: applied.clone(),
            deleted: deleted.clone(),
        }));
        let processor = DeploymentProcessor::new(handlers);

        let resources = vec![
            resource("service", "service", &["deployment"]),
            resource("deployment", "deployment", &[]),
        ];
        processor.deploy(&resources).await.unwrap();

        assert_eq!(*applied.lock().unwrap(), vec!["deployment", "service"]);
    }

    #[tokio::test]
    async fn delete_tears_down_dependents_before_dependencies() {
        let applied = Arc::new(Mutex::new(Vec::new()));
        let deleted = Arc::new(Mutex::new(Vec::new()));
        let mut handlers = HandlerRegistry::new();
        handlers.register(Box::new(RecordingHandler {
            kind: "deployment".to_string(),
            applied: applied.clone(),
            deleted: deleted.clone(),
        }));
        handlers.register(Box::new(RecordingHandler {
            kind: "service".to_string(),
            applied: applied.clone(),
            deleted: deleted.clone(),
        }));
        let processor = DeploymentProcessor::new(handlers);

        let resources = vec![
            resource("service", "service", &["deployment"]),
            resource("deployment", "deployment", &[]),
        ];
        processor.delete(&resources).await.unwrap();

        assert_eq!(*deleted.lock().unwrap(), vec!["service", "deployment"]);
    }

    #[tokio::test]
    async fn deploy_with_unregistered_kind_fails() {
        let processor = DeploymentProcessor::new(HandlerRegistry::new());
        let resources = vec![resource("a", "unknown", &[])];
        let err = processor.deploy(&resources).await.unwrap_err();
        assert!(matches!(err, crate::error::Error::UnknownHandler { .. }));
    }
}
