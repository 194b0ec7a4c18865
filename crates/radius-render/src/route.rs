//! Renders `Applications.Core/httpRoutes`.
//!
//! A route is a purely logical resource: it never produces an output resource of its own. Its
//! only job is to publish the `hostname`/`port` computed values a container's `Service` is
//! reachable at, which a consuming container resolves as a dependency.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::{MissingPropertySnafu, Result},
    model::{RenderInput, RenderOutput},
    renderer::Renderer,
};
use snafu::OptionExt as _;

const RESOURCE_TYPE: &str = "Applications.Core/httpRoutes";

#[derive(Deserialize)]
struct RouteProperties {
    #[serde(default = "default_port")]
    port: i32,
}

fn default_port() -> i32 {
    80
}

pub struct RouteRenderer;

impl Renderer for RouteRenderer {
    fn resource_type(&self) -> &str {
        RESOURCE_TYPE
    }

    fn render(&self, input: RenderInput<'_>) -> Result<RenderOutput> {
        let properties: RouteProperties = if input.properties.is_null() {
            RouteProperties { port: default_port() }
        } else {
            serde_json::from_value(input.properties.clone())
                .ok()
                .context(MissingPropertySnafu { field: "port" })?
        };

        let mut computed_values: BTreeMap<String, Value> = BTreeMap::new();
        computed_values.insert(
            "hostname".to_string(),
            Value::String(format!("{}.{}", input.resource_name, input.namespace)),
        );
        computed_values.insert("port".to_string(), Value::Number(properties.port.into()));

        Ok(RenderOutput {
            output_resources: vec![],
            computed_values,
            secret_values: BTreeMap::new(),
        })
    }
}
