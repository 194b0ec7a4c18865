use indexmap::IndexMap;

use crate::{
    error::{Result, UnknownResourceTypeSnafu},
    model::{RenderInput, RenderOutput},
};
use snafu::OptionExt as _;

/// Turns one tracked resource's properties (plus its already-rendered dependencies) into the
/// output resources it needs.
///
/// Implementations must be pure: given the same input they always produce the same output, and
/// they never talk to an external system directly (that is the handler's job, once the
/// deployment processor has decided to apply the output resources this returns).
pub trait Renderer: Send + Sync {
    /// The Radius resource type this renderer handles, e.g. `"Applications.Core/containers"`.
    fn resource_type(&self) -> &str;

    fn render(&self, input: RenderInput<'_>) -> Result<RenderOutput>;
}

/// Looks up the [`Renderer`] registered for a resource type.
///
/// This is the "application model" (component I): the set of Radius resource types the runtime
/// knows how to turn into output resources.
#[derive(Default)]
pub struct RendererRegistry {
    renderers: IndexMap<String, Box<dyn Renderer>>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, renderer: Box<dyn Renderer>) -> &mut Self {
        self.renderers
            .insert(renderer.resource_type().to_string(), renderer);
        self
    }

    /// Equivalent to "LookupRadiusResourceModel": find the renderer for `resource_type`.
    pub fn renderer_for(&self, resource_type: &str) -> Result<&dyn Renderer> {
        self.renderers
            .get(resource_type)
            .map(AsRef::as_ref)
            .context(UnknownResourceTypeSnafu {
                resource_type: resource_type.to_string(),
            })
    }
}
