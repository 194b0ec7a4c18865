#[derive(Debug, PartialEq, Eq, clap::Parser)]
#[command(next_help_heading = "Environment Options")]
pub struct OperatorEnvironmentOptions {
    /// The namespace this host supervisor process is running in.
    ///
    /// When running on Kubernetes we recommend using the
    /// [downward API](https://kubernetes.io/docs/concepts/workloads/pods/downward-api/)
    /// to let Kubernetes project the namespace as the `OPERATOR_NAMESPACE` env variable.
    #[arg(long, env)]
    pub operator_namespace: String,

    /// The name of the Service this process is reachable at, used to build the base URL
    /// advertised in async-operation status responses.
    #[arg(long, env)]
    pub operator_service_name: String,
}
