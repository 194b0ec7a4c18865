//! Applies and deletes Kubernetes-backed output resources via server-side apply.
//!
//! One [`KubernetesHandler<T>`] is registered per output resource kind (`Deployment`,
//! `Service`, ...); the generic logic — deserialize, apply, reserialize, delete idempotently —
//! is identical across kinds and mirrors `radius-store`'s `KubernetesStore::save`.

use std::marker::PhantomData;

use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use kube::{
    Resource,
    api::{DeleteParams, Patch, PatchParams},
};
use radius_core::client::Client;
use radius_processor::{Error, OutputResourceHandler, PutResult};
use radius_store::OutputResource;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use tracing::{info, instrument};

const FIELD_MANAGER: &str = "radius-rp";

/// Applies one output resource kind as a plain Kubernetes object, server-side-applied under a
/// shared field manager so repeated deploys of the same resource converge rather than conflict.
pub struct KubernetesHandler<T> {
    kind: &'static str,
    client: Client,
    _marker: PhantomData<fn() -> T>,
}

impl<T> KubernetesHandler<T> {
    pub fn new(kind: &'static str, client: Client) -> Self {
        KubernetesHandler {
            kind,
            client,
            _marker: PhantomData,
        }
    }
}

fn object_identity(properties: &Map<String, Value>) -> Option<(String, String)> {
    let name = properties
        .get("metadata")?
        .get("name")?
        .as_str()?
        .to_string();
    let namespace = properties
        .get("metadata")?
        .get("namespace")?
        .as_str()?
        .to_string();
    Some((name, namespace))
}

fn classify(local_id: &str, source: kube::Error) -> Error {
    match &source {
        kube::Error::Api(response) if (400..500).contains(&response.code) && response.code != 429 => {
            Error::HandlerPermanent {
                local_id: local_id.to_string(),
                message: source.to_string(),
            }
        }
        _ => Error::HandlerTransient {
            local_id: local_id.to_string(),
            message: source.to_string(),
        },
    }
}

fn to_persisted<V: Serialize>(value: &V) -> Map<String, Value> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

#[async_trait]
impl<T> OutputResourceHandler for KubernetesHandler<T>
where
    T: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + std::fmt::Debug
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static,
{
    fn kind(&self) -> &str {
        self.kind
    }

    #[instrument(skip_all, fields(local_id = %resource.local_id))]
    async fn put(&self, resource: &OutputResource) -> radius_processor::Result<PutResult> {
        let (name, namespace) =
            object_identity(&resource.persisted_properties).ok_or_else(|| Error::HandlerPermanent {
                local_id: resource.local_id.clone(),
                message: "output resource is missing metadata.name or metadata.namespace".to_string(),
            })?;

        let object: T = serde_json::from_value(Value::Object(resource.persisted_properties.clone()))
            .map_err(|err| Error::HandlerPermanent {
                local_id: resource.local_id.clone(),
                message: format!("persisted properties do not decode as {}: {err}", self.kind),
            })?;

        let api = self.client.get_api::<T>(&namespace);
        info!(%name, %namespace, "applying output resource");
        let applied = api
            .patch(&name, &PatchParams::apply(FIELD_MANAGER).force(), &Patch::Apply(&object))
            .await
            .map_err(|err| classify(&resource.local_id, err))?;

        Ok(PutResult {
            persisted_properties: to_persisted(&applied),
        })
    }

    #[instrument(skip_all, fields(local_id = %resource.local_id))]
    async fn delete(&self, resource: &OutputResource) -> radius_processor::Result<()> {
        let (name, namespace) =
            object_identity(&resource.persisted_properties).ok_or_else(|| Error::HandlerPermanent {
                local_id: resource.local_id.clone(),
                message: "output resource is missing metadata.name or metadata.namespace".to_string(),
            })?;

        let api = self.client.get_api::<T>(&namespace);
        info!(%name, %namespace, "deleting output resource");
        match api.delete(&name, &DeleteParams::default()).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(response)) if response.code == 404 => Ok(()),
            Err(err) => Err(classify(&resource.local_id, err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn object_identity_reads_name_and_namespace() {
        let Value::Object(props) = json!({
            "metadata": { "name": "front", "namespace": "default" },
        }) else {
            unreachable!()
        };
        assert_eq!(
            object_identity(&props),
            Some(("front".to_string(), "default".to_string()))
        );
    }

    #[test]
    fn object_identity_is_none_without_namespace() {
        let Value::Object(props) = json!({ "metadata": { "name": "front" } }) else {
            unreachable!()
        };
        assert_eq!(object_identity(&props), None);
    }

    #[test]
    fn a_4xx_api_error_is_permanent() {
        let source = kube::Error::Api(kube::core::ErrorResponse {
            status: "Failure".to_string(),
            message: "invalid".to_string(),
            reason: "Invalid".to_string(),
            code: 422,
        });
        assert!(matches!(classify("deployment", source), Error::HandlerPermanent { .. }));
    }

    #[test]
    fn a_5xx_api_error_is_transient() {
        let source = kube::Error::Api(kube::core::ErrorResponse {
            status: "Failure".to_string(),
            message: "unavailable".to_string(),
            reason: "ServiceUnavailable".to_string(),
            code: 503,
        });
        assert!(matches!(classify("deployment", source), Error::HandlerTransient { .. }));
    }
}
