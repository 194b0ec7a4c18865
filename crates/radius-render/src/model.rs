//! The inputs and outputs of a single [`Renderer::render`](crate::Renderer::render) call.

use std::collections::BTreeMap;

use radius_store::{OutputResource, ResourceId};
use serde_json::Value;

/// An already-rendered dependency, as resolved by the deployment processor before it invokes
/// the dependent resource's renderer.
#[derive(Clone, Debug)]
pub struct ResolvedDependency {
    pub resource_id: ResourceId,
    pub resource_type: String,
    pub computed_values: BTreeMap<String, Value>,
}

/// What a [`Renderer`](crate::Renderer) needs to produce output resources for one tracked
/// resource.
#[derive(Clone, Debug)]
pub struct RenderInput<'a> {
    pub resource_id: &'a ResourceId,
    pub resource_name: &'a str,
    pub namespace: &'a str,
    pub properties: &'a Value,
    pub dependencies: &'a [ResolvedDependency],
}

/// A pointer into the secret store rather than a raw value, so rendered output never carries
/// plaintext secret data through the resource store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecretReference {
    pub scope: String,
    pub name: String,
    pub key: String,
}

/// The result of rendering one tracked resource: the platform artefacts it needs, plus the
/// values other resources may depend on.
#[derive(Clone, Debug, Default)]
pub struct RenderOutput {
    pub output_resources: Vec<OutputResource>,
    pub computed_values: BTreeMap<String, Value>,
    pub secret_values: BTreeMap<String, SecretReference>,
}
