//! A [`ResourceStore`] backed by a single generic Kubernetes custom resource.
//!
//! Each tracked resource, regardless of its Radius resource type, is mirrored to one
//! `RadiusResource` custom resource in the configured namespace; the resource's own type name
//! is carried in `spec.resource_type` rather than via one CRD per type, since the store is
//! generic over the properties payload `P` and `kube::CustomResource` cannot be derived for a
//! generic struct. The Kubernetes `resourceVersion` serves directly as this backend's [`ETag`].

use async_trait::async_trait;
use kube::{
    Api, CustomResource, Resource, ResourceExt,
    api::{Patch, PatchParams, PostParams},
};
use radius_core::client::Client;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use snafu::{OptionExt, ResultExt};

use crate::{
    error::{KubernetesSnafu, NotFoundSnafu, Result},
    model::{ETag, ResourceId, TrackedResource},
    store::{Page, ResourceStore},
};

/// The wire shape of the generic custom resource. `properties` carries the
/// caller-supplied `P`, serialized to JSON, alongside the rest of [`TrackedResource`]'s
/// fields flattened into the spec.
#[derive(Clone, Debug, CustomResource, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "radius.io",
    version = "v1alpha1",
    kind = "RadiusResource",
    namespaced
)]
pub struct RadiusResourceSpec {
    pub id: ResourceId,
    pub name: String,
    pub resource_type: String,
    pub system_data: crate::model::SystemData,
    pub provisioning_state: crate::model::ProvisioningState,
    pub output_resources: Vec<crate::model::OutputResource>,
    pub properties: serde_json::Value,
}

fn object_name(id: &ResourceId) -> String {
    // Kubernetes object names must be DNS-1123 subdomains; resource ids are not, so derive a
    // deterministic, collision-resistant name from the id instead of using it directly.
    let digest = id.as_str().bytes().fold(0u64, |acc, b| {
        acc.wrapping_mul(31).wrapping_add(u64::from(b))
    });
    format!("radius-{:016x}", digest)
}

fn to_tracked<P: DeserializeOwned>(
    resource: &RadiusResource,
) -> Result<TrackedResource<P>> {
    let properties: P = serde_json::from_value(resource.spec.properties.clone())
        .context(crate::error::DeserializeSnafu {
            id: resource.spec.id.clone(),
        })?;
    Ok(TrackedResource {
        id: resource.spec.id.clone(),
        name: resource.spec.name.clone(),
        resource_type: resource.spec.resource_type.clone(),
        system_data: resource.spec.system_data.clone(),
        provisioning_state: resource.spec.provisioning_state,
        output_resources: resource.spec.output_resources.clone(),
        properties,
    })
}

/// A [`ResourceStore`] implementation that mirrors every tracked resource to a
/// [`RadiusResource`] custom resource in `namespace`.
pub struct KubernetesStore {
    client: Client,
    namespace: String,
}

impl KubernetesStore {
    pub fn new(client: Client, namespace: impl Into<String>) -> Self {
        KubernetesStore {
            client,
            namespace: namespace.into(),
        }
    }

    fn api(&self) -> Api<RadiusResource> {
        self.client.get_api(&self.namespace)
    }
}

#[async_trait]
impl<P> ResourceStore<P> for KubernetesStore
where
    P: Serialize + DeserializeOwned + Send + Sync + Clone + 'static,
{
    async fn save(&self, resource: TrackedResource<P>, if_match: Option<&ETag>) -> Result<ETag> {
        let name = object_name(&resource.id);
        let properties = serde_json::to_value(&resource.properties).context(
            crate::error::SerializeSnafu {
                id: resource.id.clone(),
            },
        )?;
        let spec = RadiusResourceSpec {
            id: resource.id.clone(),
            name: resource.name,
            resource_type: resource.resource_type,
            system_data: resource.system_data,
            provisioning_state: resource.provisioning_state,
            output_resources: resource.output_resources,
            properties,
        };

        let api = self.api();
        let mut object = RadiusResource::new(&name, spec);
        if let Some(etag) = if_match {
            object.meta_mut().resource_version = Some(etag.as_str().to_string());
        }

        let patch_result = api
            .patch(
                &name,
                &PatchParams::apply("radius-store").force(),
                &Patch::Apply(&object),
            )
            .await;

        let saved = match patch_result {
            Ok(saved) => saved,
            Err(kube::Error::Api(err)) if err.code == 404 => api
                .create(&PostParams::default(), &object)
                .await
                .context(KubernetesSnafu {
                    id: resource.id.clone(),
                })?,
            Err(kube::Error::Api(err)) if err.code == 409 => {
                return crate::error::ConcurrencySnafu {
                    id: resource.id.clone(),
                }
                .fail();
            }
            Err(source) => {
                return Err(source).context(KubernetesSnafu {
                    id: resource.id.clone(),
                });
            }
        };

        Ok(ETag::new(saved.resource_version().unwrap_or_default()))
    }

    async fn get(&self, id: &ResourceId) -> Result<(TrackedResource<P>, ETag)> {
        let name = object_name(id);
        let found = self
            .api()
            .get_opt(&name)
            .await
            .context(KubernetesSnafu { id: id.clone() })?
            .context(NotFoundSnafu { id: id.clone() })?;
        let etag = ETag::new(found.resource_version().unwrap_or_default());
        let tracked = to_tracked(&found)?;
        Ok((tracked, etag))
    }

    async fn delete(&self, id: &ResourceId, if_match: Option<&ETag>) -> Result<()> {
        let name = object_name(id);
        let api = self.api();

        let Some(existing) = api
            .get_opt(&name)
            .await
            .context(KubernetesSnafu { id: id.clone() })?
        else {
            return Ok(());
        };

        if let Some(expected) = if_match {
            let current = ETag::new(existing.resource_version().unwrap_or_default());
            if current != *expected {
                return crate::error::ConcurrencySnafu { id: id.clone() }.fail();
            }
        }

        api.delete(&name, &kube::api::DeleteParams::default())
            .await
            .context(KubernetesSnafu { id: id.clone() })?;
        Ok(())
    }

    async fn query(
        &self,
        root_scope: &str,
        resource_type: &str,
        continuation_token: Option<&str>,
        max_items: usize,
    ) -> Result<Page<P>> {
        let mut params = kube::api::ListParams::default().limit(max_items as u32);
        if let Some(token) = continuation_token {
            params = params.continue_token(token);
        }

        let list = self
            .api()
            .list(&params)
            .await
            .context(crate::error::KubernetesQuerySnafu)?;

        let next_token = list.metadata.continue_.clone();
        let mut items = Vec::with_capacity(list.items.len());
        for object in &list.items {
            if object.spec.resource_type.eq_ignore_ascii_case(resource_type)
                && object.spec.id.as_str().contains(root_scope)
            {
                items.push(to_tracked(object)?);
            }
        }

        Ok(Page { items, next_token })
    }
}
