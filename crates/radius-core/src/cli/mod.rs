//! Contains various types for composing the CLI interface of the host supervisor and other
//! processes that form the control plane.

use clap::{Args, Parser};
use radius_telemetry::tracing::TelemetryOptions;

use crate::namespace::WatchNamespace;

mod environment;
mod maintenance;

pub use environment::*;
pub use maintenance::*;

/// The commands understood by the host supervisor binary.
///
/// This enum is generic over the arguments available to the [`Command::Run`] subcommand. By
/// default, [`RunArguments`] is used, but a custom type can be used.
///
/// ```rust
/// use radius_core::cli::Command;
/// use clap::Parser;
///
/// #[derive(Parser)]
/// struct Run {
///     #[arg(long)]
///     name: String,
/// }
///
/// let _ = Command::<Run>::parse_from(["radius-rp", "run", "--name", "foo"]);
/// ```
///
/// If extra commands are needed, flatten [`Command`] into a custom command enum.
///
/// ```rust
/// use radius_core::cli::Command;
/// use clap::Parser;
///
/// #[derive(Parser)]
/// enum CustomCommand {
///     /// Print the resolved configuration and exit
///     PrintConfig,
///
///     #[clap(flatten)]
///     Framework(Command)
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Parser)]
pub enum Command<Run: Args = RunArguments> {
    /// Run the host supervisor.
    Run(Run),
}

/// Default CLI arguments the host supervisor takes when running.
///
/// ### Embed into an extended argument set
///
/// ```rust
/// use radius_core::cli::RunArguments;
/// use clap::Parser;
///
/// #[derive(clap::Parser, Debug, PartialEq, Eq)]
/// struct Run {
///     #[clap(long)]
///     name: String,
///
///     #[clap(flatten)]
///     common: RunArguments,
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Parser)]
#[command(long_about = "")]
pub struct RunArguments {
    /// Path to the control plane configuration file (store, queue, secret provider wiring).
    #[arg(long, short = 'c', value_name = "FILE", env)]
    pub config: std::path::PathBuf,

    // TODO (@Techassi): This should be moved into the environment options
    /// Restricts the Kubernetes resource handler to a specific namespace (instead of watching
    /// all namespaces it has RBAC access to).
    #[arg(long, env, default_value = "")]
    pub watch_namespace: WatchNamespace,

    // IMPORTANT: All (flattened) sub structs should be placed at the end to ensure the help
    // headings are correct.
    #[command(flatten)]
    pub common: CommonOptions,

    #[command(flatten)]
    pub maintenance: MaintenanceOptions,

    #[command(flatten)]
    pub operator_environment: OperatorEnvironmentOptions,
}

/// A set of CLI arguments shared across control plane processes.
#[derive(Debug, PartialEq, Eq, Args)]
pub struct CommonOptions {
    #[command(flatten)]
    pub telemetry: TelemetryOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;

        RunArguments::command().print_long_help().unwrap();
        RunArguments::command().debug_assert()
    }
}
