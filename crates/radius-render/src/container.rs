//! Renders `Applications.Core/containers` into a `Deployment` and, if the container exposes
//! at least one port, a matching `Service`.

use std::collections::BTreeMap;

use k8s_openapi::{
    api::{
        apps::v1::{Deployment, DeploymentSpec},
        core::v1::{Service, ServicePort, ServiceSpec},
    },
    apimachinery::pkg::apis::meta::v1::LabelSelector,
};
use radius_core::{
    builder::{
        meta::ObjectMetaBuilder,
        pod::{PodBuilder, container::ContainerBuilder},
    },
    kvp::{KeyValuePairsExt as _, Labels, well_known},
};
use radius_store::{OutputResource, OutputResourceProvider};
use serde::Deserialize;
use snafu::ResultExt as _;

use crate::{
    error::{InvalidPropertySnafu, LabelSnafu, MissingPropertySnafu, Result},
    model::{RenderInput, RenderOutput},
    renderer::Renderer,
};

const RESOURCE_TYPE: &str = "Applications.Core/containers";

#[derive(Deserialize)]
pub struct ContainerPort {
    pub name: String,
    pub container_port: i32,
    #[serde(default)]
    pub expose: bool,
}

#[derive(Deserialize)]
pub struct ContainerProperties {
    pub image: String,
    #[serde(default)]
    pub ports: Vec<ContainerPort>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// Renders a container resource, grounded on [`PodBuilder`]/[`ContainerBuilder`] for the
/// `Deployment`'s pod template and on [`well_known`] labels for the selector both objects share.
pub struct ContainerRenderer;

fn selector_labels(resource_id: &str) -> Result<Labels> {
    let mut labels = Labels::from_iter([well_known::resource_id(resource_id).context(LabelSnafu)?]);
    labels.extend([well_known::component("container").context(LabelSnafu)?]);
    Ok(labels)
}

impl Renderer for ContainerRenderer {
    fn resource_type(&self) -> &str {
        RESOURCE_TYPE
    }

    fn render(&self, input: RenderInput<'_>) -> Result<RenderOutput> {
        let properties: ContainerProperties = serde_json::from_value(input.properties.clone())
            .map_err(|_| MissingPropertySnafu { field: "image" }.build())?;

        let selector = selector_labels(input.resource_id.as_str())?;
        let selector_map = selector.to_unvalidated();

        let mut container = ContainerBuilder::new(input.resource_name)
            .map_err(|_| InvalidPropertySnafu { field: "name" }.build())?;
        container.image(properties.image.as_str());
        for (key, value) in &properties.env {
            container.add_env_var(key.as_str(), value.as_str());
        }
        for port in &properties.ports {
            container.add_container_port(port.name.as_str(), port.container_port);
        }
        let container = container.build();

        let mut pod_builder = PodBuilder::new();
        pod_builder
            .metadata(
                ObjectMetaBuilder::new()
                    .with_labels(selector.clone())
                    .build(),
            )
            .add_container(container);
        let pod_template = pod_builder.build_template();

        let deployment_name = input.resource_name.to_string();
        let deployment = Deployment {
            metadata: ObjectMetaBuilder::new()
                .name(deployment_name.clone())
                .namespace(input.namespace)
                .with_labels(selector.clone())
                .build(),
            spec: Some(DeploymentSpec {
                selector: LabelSelector {
                    match_labels: Some(selector_map.clone()),
                    ..Default::default()
                },
                template: pod_template,
                ..Default::default()
            }),
            ..Default::default()
        };

        let mut output_resources = vec![OutputResource {
            local_id: "deployment".to_string(),
            kind: "kubernetes.apps.deployment".to_string(),
            provider: OutputResourceProvider::Kubernetes,
            identity: format!("apps/v1/Deployment/{}/{deployment_name}", input.namespace),
            persisted_properties: to_persisted(&deployment),
            dependencies: vec![],
        }];

        let exposed_ports: Vec<_> = properties.ports.iter().filter(|p| p.expose).collect();
        if !exposed_ports.is_empty() {
            let service = Service {
                metadata: ObjectMetaBuilder::new()
                    .name(deployment_name.clone())
                    .namespace(input.namespace)
                    .with_labels(selector.clone())
                    .build(),
                spec: Some(ServiceSpec {
                    selector: Some(selector_map),
                    ports: Some(
                        exposed_ports
                            .iter()
                            .map(|port| ServicePort {
                                name: Some(port.name.clone()),
                                port: port.container_port,
                                ..Default::default()
                            })
                            .collect(),
                    ),
                    ..Default::default()
                }),
                ..Default::default()
            };

            output_resources.push(OutputResource {
                local_id: "service".to_string(),
                kind: "kubernetes.core.service".to_string(),
                provider: OutputResourceProvider::Kubernetes,
                identity: format!("v1/Service/{}/{deployment_name}", input.namespace),
                persisted_properties: to_persisted(&service),
                dependencies: vec!["deployment".to_string()],
            });
        }

        let mut computed_values = BTreeMap::new();
        computed_values.insert(
            "hostname".to_string(),
            serde_json::Value::String(format!("{deployment_name}.{}", input.namespace)),
        );

        Ok(RenderOutput {
            output_resources,
            computed_values,
            secret_values: BTreeMap::new(),
        })
    }
}

fn to_persisted<T: serde::Serialize>(value: &T) -> serde_json::Map<String, serde_json::Value> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use radius_store::ResourceId;
    use serde_json::json;

    use super::*;

    #[test]
    fn deployment_and_service_share_a_selector() {
        let resource_id = ResourceId::parse(
            "/planes/radius/local/resourceGroups/g/providers/Applications.Core/containers/front",
        )
        .unwrap();
        let properties = json!({
            "image": "nginx:latest",
            "ports": [{ "name": "http", "containerPort": 8080, "expose": true }],
        });

        let output = ContainerRenderer
            .render(RenderInput {
                resource_id: &resource_id,
                resource_name: "front",
                namespace: "default",
                properties: &properties,
                dependencies: &[],
            })
            .unwrap();

        assert_eq!(output.output_resources.len(), 2);
        let deployment = &output.output_resources[0];
        let service = &output.output_resources[1];
        assert_eq!(deployment.kind, "kubernetes.apps.deployment");
        assert_eq!(service.kind, "kubernetes.core.service");
        assert_eq!(service.dependencies, vec!["deployment".to_string()]);

        let deployment_labels = deployment.persisted_properties["metadata"]["labels"].clone();
        let service_selector = service.persisted_properties["spec"]["selector"].clone();
        assert_eq!(deployment_labels, service_selector);
    }

    #[test]
    fn container_without_exposed_ports_has_no_service() {
        let resource_id = ResourceId::parse(
            "/planes/radius/local/resourceGroups/g/providers/Applications.Core/containers/worker",
        )
        .unwrap();
        let properties = json!({ "image": "worker:latest" });

        let output = ContainerRenderer
            .render(RenderInput {
                resource_id: &resource_id,
                resource_name: "worker",
                namespace: "default",
                properties: &properties,
                dependencies: &[],
            })
            .unwrap();

        assert_eq!(output.output_resources.len(), 1);
    }
}
