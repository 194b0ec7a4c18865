//! The host supervisor's merged configuration: provider wiring for the resource store, queue,
//! and secret store, the set of resource-provider planes, and the ambient observability and
//! UCP-facing settings shared by every control plane process.
//!
//! The document is consumed in three layers — built-in defaults, the `--config` file, then CLI
//! flags — each producing a [`ConfigFragment`], [merged](radius_core::config::merge::Merge) in
//! that order, and finally [validated](radius_core::config::fragment::validate) into [`Config`].

use radius_core::config::{
    fragment::{Fragment, FromFragment, ValidationError, Validator},
    merge::Merge,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The backend a provider block is wired to.
///
/// `#[derive(Fragment)]` does not support enums directly, so provider selection is a leaf
/// field of an otherwise-fragmentable struct rather than the fragmentable type itself; see the
/// hand-written [`FromFragment`]/[`Merge`] impls below.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    ApiServer,
    Etcd,
    InMemory,
}

impl FromFragment for ProviderKind {
    type Fragment = Option<ProviderKind>;
    type RequiredFragment = ProviderKind;

    fn from_fragment(
        fragment: Self::Fragment,
        validator: Validator,
    ) -> Result<Self, ValidationError> {
        fragment.ok_or_else(|| validator.error_required())
    }
}

impl Merge for Option<ProviderKind> {
    fn merge(&mut self, defaults: &Self) {
        if self.is_none() {
            *self = *defaults;
        }
    }
}

/// Wiring for the resource store (component A).
#[derive(Fragment, Clone, Debug, PartialEq, Eq)]
#[fragment_attrs(derive(Clone, Debug, Default, PartialEq, Merge, Serialize, Deserialize, JsonSchema))]
pub struct StorageProviderConfig {
    #[fragment_attrs(serde(default))]
    pub provider: ProviderKind,

    /// Namespace the `apiserver` provider stores tracked-resource custom resources in.
    #[fragment_attrs(serde(default))]
    pub namespace: Option<String>,

    /// Endpoint the `etcd` provider dials.
    #[fragment_attrs(serde(default))]
    pub endpoint: Option<String>,
}

/// Wiring for the queue (component B).
#[derive(Fragment, Clone, Debug, PartialEq, Eq)]
#[fragment_attrs(derive(Clone, Debug, Default, PartialEq, Merge, Serialize, Deserialize, JsonSchema))]
pub struct QueueProviderConfig {
    #[fragment_attrs(serde(default))]
    pub provider: ProviderKind,

    #[fragment_attrs(serde(default))]
    pub namespace: Option<String>,

    #[fragment_attrs(serde(default))]
    pub endpoint: Option<String>,

    /// Seconds a dequeued message stays invisible before it is eligible for redelivery.
    #[fragment_attrs(serde(default))]
    pub visibility_timeout_seconds: u64,

    /// Deliveries after which an undelivered message is moved to the dead-letter area.
    #[fragment_attrs(serde(default))]
    pub max_deliveries: u32,
}

/// Wiring for the secret store (component C).
#[derive(Fragment, Clone, Debug, PartialEq, Eq)]
#[fragment_attrs(derive(Clone, Debug, Default, PartialEq, Merge, Serialize, Deserialize, JsonSchema))]
pub struct SecretProviderConfig {
    #[fragment_attrs(serde(default))]
    pub provider: ProviderKind,

    #[fragment_attrs(serde(default))]
    pub namespace: Option<String>,

    #[fragment_attrs(serde(default))]
    pub endpoint: Option<String>,
}

/// One upstream resource-provider namespace the front end routes non-native resource types to.
///
/// The whole list is replaced wholesale by whichever config layer sets it last, rather than
/// merged entry-by-entry, since a partial overlay of a plane list rarely makes sense.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PlaneConfig {
    /// The resource-provider namespace this plane serves, e.g. `Applications.Core`.
    pub namespace: String,

    /// The base URL of the upstream resource provider.
    pub endpoint: String,
}

impl FromFragment for Vec<PlaneConfig> {
    type Fragment = Option<Vec<PlaneConfig>>;
    type RequiredFragment = Vec<PlaneConfig>;

    fn from_fragment(
        fragment: Self::Fragment,
        validator: Validator,
    ) -> Result<Self, ValidationError> {
        fragment.ok_or_else(|| validator.error_required())
    }
}

impl Merge for Option<Vec<PlaneConfig>> {
    fn merge(&mut self, defaults: &Self) {
        if self.is_none() {
            self.clone_from(defaults);
        }
    }
}

/// Workload identity settings used when a handler has to authenticate to a cloud provider.
#[derive(Fragment, Clone, Debug, PartialEq, Eq)]
#[fragment_attrs(derive(Clone, Debug, Default, PartialEq, Merge, Serialize, Deserialize, JsonSchema))]
pub struct IdentityConfig {
    /// Kubernetes service account the workload identity webhook projects a token for.
    #[fragment_attrs(serde(default))]
    pub service_account: Option<String>,

    /// OIDC issuer URL trusted by the downstream cloud provider.
    #[fragment_attrs(serde(default))]
    pub issuer: Option<String>,
}

#[derive(Fragment, Clone, Debug, PartialEq, Eq)]
#[fragment_attrs(derive(Clone, Debug, Default, PartialEq, Merge, Serialize, Deserialize, JsonSchema))]
pub struct MetricsProviderConfig {
    #[fragment_attrs(serde(default))]
    pub enabled: bool,

    /// Path the Prometheus scrape endpoint is served at.
    #[fragment_attrs(serde(default))]
    pub path: Option<String>,
}

#[derive(Fragment, Clone, Debug, PartialEq, Eq)]
#[fragment_attrs(derive(Clone, Debug, Default, PartialEq, Merge, Serialize, Deserialize, JsonSchema))]
pub struct TracerProviderConfig {
    #[fragment_attrs(serde(default))]
    pub enabled: bool,

    /// Service name traces are attributed to.
    #[fragment_attrs(serde(default))]
    pub service_name: Option<String>,
}

#[derive(Fragment, Clone, Debug, PartialEq, Eq)]
#[fragment_attrs(derive(Clone, Debug, Default, PartialEq, Merge, Serialize, Deserialize, JsonSchema))]
pub struct LoggingConfig {
    /// Overrides the `RUST_LOG`-style default level baked into `radius-telemetry`.
    #[fragment_attrs(serde(default))]
    pub level: Option<String>,

    #[fragment_attrs(serde(default))]
    pub json: bool,
}

/// Settings for reaching the Universal Control Plane this resource provider registers with.
#[derive(Fragment, Clone, Debug, PartialEq, Eq)]
#[fragment_attrs(derive(Clone, Debug, Default, PartialEq, Merge, Serialize, Deserialize, JsonSchema))]
pub struct UcpConfig {
    #[fragment_attrs(serde(default))]
    pub base_url: Option<String>,
}

/// The fully validated runtime configuration, per SPEC_FULL's external-interface document.
#[derive(Fragment, Clone, Debug, PartialEq, Eq)]
#[fragment_attrs(derive(Clone, Debug, Default, PartialEq, Merge, Serialize, Deserialize, JsonSchema))]
pub struct Config {
    #[fragment_attrs(serde(default))]
    pub storage_provider: StorageProviderConfig,

    #[fragment_attrs(serde(default))]
    pub queue_provider: QueueProviderConfig,

    #[fragment_attrs(serde(default))]
    pub secret_provider: SecretProviderConfig,

    #[fragment_attrs(serde(default))]
    pub planes: Vec<PlaneConfig>,

    #[fragment_attrs(serde(default))]
    pub identity: IdentityConfig,

    #[fragment_attrs(serde(default))]
    pub metrics_provider: MetricsProviderConfig,

    #[fragment_attrs(serde(default))]
    pub tracer_provider: TracerProviderConfig,

    #[fragment_attrs(serde(default))]
    pub logging: LoggingConfig,

    #[fragment_attrs(serde(default))]
    pub ucp: UcpConfig,
}

/// Built-in defaults: an all in-memory control plane serving no upstream planes, suitable for
/// local development and the integration tests in this crate.
impl Default for ConfigFragment {
    fn default() -> Self {
        ConfigFragment {
            storage_provider: StorageProviderConfigFragment {
                provider: Some(ProviderKind::InMemory),
                namespace: None,
                endpoint: None,
            },
            queue_provider: QueueProviderConfigFragment {
                provider: Some(ProviderKind::InMemory),
                namespace: None,
                endpoint: None,
                visibility_timeout_seconds: Some(30),
                max_deliveries: Some(5),
            },
            secret_provider: SecretProviderConfigFragment {
                provider: Some(ProviderKind::InMemory),
                namespace: None,
                endpoint: None,
            },
            planes: Some(Vec::new()),
            identity: IdentityConfigFragment::default(),
            metrics_provider: MetricsProviderConfigFragment {
                enabled: Some(false),
                path: Some("/metrics".to_string()),
            },
            tracer_provider: TracerProviderConfigFragment {
                enabled: Some(false),
                service_name: Some("radius-rp".to_string()),
            },
            logging: LoggingConfigFragment {
                level: None,
                json: Some(false),
            },
            ucp: UcpConfigFragment { base_url: None },
        }
    }
}
