//! CLI flags wiring [`Tracing`] into a `clap`-derived command, shared by every control plane
//! binary so each one configures logging and tracing the same way.

use clap::Args;
use tracing::level_filters::LevelFilter;

use crate::tracing::{
    Error, Tracing,
    settings::{Build as _, Settings},
};

/// Shared CLI flags for configuring the console, OTLP log, and OTLP trace subscribers.
#[derive(Debug, PartialEq, Eq, Args)]
#[command(next_help_heading = "Logging Options")]
pub struct TelemetryOptions {
    /// Disable console log output.
    #[arg(long, env)]
    pub no_console_log: bool,

    /// Export logs via OTLP instead of (or in addition to) the console.
    #[arg(long, env)]
    pub otlp_log_export: bool,

    /// Export traces via OTLP.
    #[arg(long, env)]
    pub otlp_trace_export: bool,
}

impl TelemetryOptions {
    /// Initializes the subscribers these flags select for `service_name`, returning a guard
    /// that must be held for the lifetime of the process; see [`Tracing::init`].
    pub fn init(&self, service_name: &'static str) -> Result<Tracing, Error> {
        Tracing::builder()
            .service_name(service_name)
            .with_console_output(
                Settings::builder()
                    .with_environment_variable("RUST_LOG")
                    .with_default_level(LevelFilter::INFO)
                    .enabled(!self.no_console_log)
                    .build(),
            )
            .with_otlp_log_exporter(
                Settings::builder()
                    .with_environment_variable("RUST_LOG")
                    .with_default_level(LevelFilter::INFO)
                    .enabled(self.otlp_log_export)
                    .build(),
            )
            .with_otlp_trace_exporter(
                Settings::builder()
                    .with_environment_variable("RUST_LOG")
                    .with_default_level(LevelFilter::INFO)
                    .enabled(self.otlp_trace_export)
                    .build(),
            )
            .build()
            .init()
    }
}
