//! Host supervisor binary (component J): parses CLI arguments, loads and validates the control
//! plane configuration, wires up the configured providers, and runs the ARM request pipeline
//! and worker pool until a shutdown signal arrives.

mod config;
mod error;
mod supervisor;

use std::{net::SocketAddr, sync::Arc};

use clap::Parser;
use radius_async_ops::MemoryOperationTracker;
use radius_core::{
    cli::{Command, RunArguments},
    client::Client,
    config::{fragment::validate, merge::Merge},
};
use radius_handlers::register_kubernetes_handlers;
use radius_processor::{DeploymentProcessor, HandlerRegistry};
use radius_queue::MemoryQueue;
use radius_render::{ContainerRenderer, RendererRegistry, RouteRenderer};
use radius_secrets::MemorySecretStore;
use radius_shared::time::Duration;
use radius_store::{MemoryStore, ResourceStore};
use serde_json::Value;
use snafu::ResultExt as _;
use tracing::debug;

use crate::{
    config::{Config, ConfigFragment, ProviderKind},
    error::{
        KubernetesClientSnafu, ParseConfigFileSnafu, ReadConfigFileSnafu, Result, TelemetrySnafu,
        UnsupportedProviderSnafu, ValidateConfigSnafu,
    },
    supervisor::Supervisor,
};

fn load_config(path: &std::path::Path) -> Result<Config> {
    let mut fragment = ConfigFragment::default();

    if path.exists() {
        let contents = std::fs::read_to_string(path).context(ReadConfigFileSnafu {
            path: path.display().to_string(),
        })?;
        let file_fragment: ConfigFragment =
            serde_yaml::from_str(&contents).context(ParseConfigFileSnafu {
                path: path.display().to_string(),
            })?;
        let mut layered = file_fragment;
        layered.merge(&fragment);
        fragment = layered;
    }

    validate::<Config>(fragment).context(ValidateConfigSnafu)
}

#[tokio::main]
async fn main() -> Result<()> {
    let Command::Run(args) = Command::<RunArguments>::parse();

    let _telemetry = args
        .common
        .telemetry
        .init("radius-rp")
        .context(TelemetrySnafu)?;

    let config = load_config(&args.config)?;

    if args.maintenance.disable_async_operation_gc {
        debug!("async-operation garbage collection disabled");
    }
    if args.maintenance.disable_queue_redelivery {
        debug!("queue redelivery disabled");
    }

    // Output resources are always applied through Kubernetes regardless of where tracked-resource
    // state lives, so the client is built unconditionally and reused for an `apiserver` store.
    let kube_client = Client::new(
        kube::Client::try_default()
            .await
            .context(KubernetesClientSnafu)?,
    );

    let store: Arc<dyn ResourceStore<Value>> = match config.storage_provider.provider {
        ProviderKind::InMemory => Arc::new(MemoryStore::new()),
        ProviderKind::ApiServer => {
            let namespace = config
                .storage_provider
                .namespace
                .clone()
                .unwrap_or_else(|| args.operator_environment.operator_namespace.clone());
            Arc::new(radius_store::kubernetes::KubernetesStore::new(
                kube_client.clone(),
                namespace,
            ))
        }
        provider @ ProviderKind::Etcd => {
            return UnsupportedProviderSnafu {
                component: "storage",
                provider,
            }
            .fail();
        }
    };

    let queue = match config.queue_provider.provider {
        ProviderKind::InMemory => Arc::new(MemoryQueue::<radius_worker::WorkItem>::new(
            config.queue_provider.max_deliveries,
        )),
        provider => {
            return UnsupportedProviderSnafu {
                component: "queue",
                provider,
            }
            .fail();
        }
    };

    let _secrets = match config.secret_provider.provider {
        ProviderKind::InMemory => Arc::new(MemorySecretStore::new()),
        provider => {
            return UnsupportedProviderSnafu {
                component: "secret",
                provider,
            }
            .fail();
        }
    };

    let operations: Arc<dyn radius_async_ops::AsyncOperationTracker> =
        Arc::new(MemoryOperationTracker::new());

    let mut renderers = RendererRegistry::new();
    renderers.register(Box::new(ContainerRenderer));
    renderers.register(Box::new(RouteRenderer));
    let renderers = Arc::new(renderers);

    let mut handlers = HandlerRegistry::new();
    register_kubernetes_handlers(&mut handlers, kube_client);
    let processor = Arc::new(DeploymentProcessor::new(handlers));

    let http_addr: SocketAddr = "0.0.0.0:8080"
        .parse()
        .expect("hardcoded socket address literal is always valid");

    let supervisor = Supervisor {
        store,
        queue,
        operations,
        renderers,
        processor,
        http_addr,
        worker_concurrency: 4,
        visibility_timeout: Duration::from_secs(config.queue_provider.visibility_timeout_seconds),
        poll_interval: Duration::from_secs(1),
    };

    supervisor.run().await
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        RunArguments::command().debug_assert();
    }

    #[test]
    fn parses_minimal_run_arguments() {
        let Command::Run(args) =
            Command::<RunArguments>::parse_from(["radius-rp", "run", "--config", "radius-rp.yaml"]);
        assert_eq!(args.config, std::path::PathBuf::from("radius-rp.yaml"));
    }

    #[test]
    fn load_config_falls_back_to_defaults_when_file_is_absent() {
        let config = load_config(std::path::Path::new("/nonexistent/radius-rp.yaml")).unwrap();
        assert_eq!(config.storage_provider.provider, ProviderKind::InMemory);
    }

    #[test]
    fn load_config_reads_and_layers_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("radius-rp.yaml");
        std::fs::write(
            &path,
            "storage_provider:\n  provider: apiserver\n  namespace: radius-system\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.storage_provider.provider, ProviderKind::ApiServer);
        assert_eq!(
            config.storage_provider.namespace.as_deref(),
            Some("radius-system")
        );
        // Fields left unset in the file still fall back to the built-in defaults.
        assert_eq!(config.queue_provider.visibility_timeout_seconds, 30);
    }
}
