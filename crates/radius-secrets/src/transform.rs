//! Derives secret values (connection strings, access keys, ...) from an output resource's
//! persisted properties, keyed by [`OutputResource::kind`](radius_store::OutputResource::kind).
//!
//! The container renderer never needs to know how to build an Azure Service Bus connection
//! string; it emits an output resource of kind `"azure.servicebus.topic"`, and the registered
//! transformer for that kind is what turns the handler's persisted properties into the secret
//! data a Dapr pub/sub component ends up referencing.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use radius_store::OutputResource;

use crate::error::{Result, TransformSnafu, UnknownTransformerSnafu};
use snafu::ResultExt as _;

/// Derives the secret key/value data for a single output resource.
pub trait SecretValueTransformer: Send + Sync {
    /// The output resource kind this transformer handles, e.g. `"azure.servicebus.topic"`.
    fn kind(&self) -> &str;

    fn transform(&self, output_resource: &OutputResource) -> Result<BTreeMap<String, String>, String>;
}

/// A lookup table of [`SecretValueTransformer`]s by output resource kind.
#[derive(Default)]
pub struct SecretTransformerRegistry {
    transformers: IndexMap<String, Box<dyn SecretValueTransformer>>,
}

impl SecretTransformerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, transformer: Box<dyn SecretValueTransformer>) -> &mut Self {
        self.transformers
            .insert(transformer.kind().to_string(), transformer);
        self
    }

    /// Transforms `output_resource` using the transformer registered for its kind.
    pub fn transform(&self, output_resource: &OutputResource) -> Result<BTreeMap<String, String>> {
        let transformer = self
            .transformers
            .get(&output_resource.kind)
            .context(UnknownTransformerSnafu {
                kind: output_resource.kind.clone(),
            })?;
        transformer
            .transform(output_resource)
            .map_err(|message| {
                TransformSnafu {
                    local_id: output_resource.local_id.clone(),
                    message,
                }
                .build()
            })
    }
}
