//! Top-level composition errors: everything that can go wrong assembling and running the host
//! supervisor, as opposed to errors raised while serving a single request (those stay inside
//! `radius-api`/`radius-worker` and are logged at the point they become a terminal outcome).

use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to read configuration file {path}"))]
    ReadConfigFile {
        source: std::io::Error,
        path: String,
    },

    #[snafu(display("failed to parse configuration file {path} as YAML"))]
    ParseConfigFile {
        source: serde_yaml::Error,
        path: String,
    },

    #[snafu(display("configuration is invalid"))]
    ValidateConfig {
        source: radius_core::config::fragment::ValidationError,
    },

    #[snafu(display("failed to initialize telemetry"))]
    Telemetry { source: radius_telemetry::tracing::Error },

    #[snafu(display("failed to construct Kubernetes client"))]
    KubernetesClient { source: kube::Error },

    #[snafu(display("failed to install signal watcher"))]
    Signal {
        source: radius_core::utils::signal::SignalError,
    },

    #[snafu(display("failed to bind HTTP listener on {addr}"))]
    BindListener {
        source: std::io::Error,
        addr: String,
    },

    #[snafu(display("{service} exited with an error"))]
    ServiceFailed {
        service: &'static str,
        source: std::io::Error,
    },

    #[snafu(display("{component} provider {provider:?} has no backend implementation yet"))]
    UnsupportedProvider {
        component: &'static str,
        provider: crate::config::ProviderKind,
    },
}
