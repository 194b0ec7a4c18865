use clap::Args;

#[derive(Debug, PartialEq, Eq, Args)]
#[command(next_help_heading = "Maintenance Options")]
pub struct MaintenanceOptions {
    /// Disable the periodic sweep that expires stale async operation records.
    ///
    /// Operation records are normally garbage collected some time after they reach a terminal
    /// state. Turning this off is mostly useful for debugging a provisioning run after the fact.
    #[arg(long, env)]
    pub disable_async_operation_gc: bool,

    /// Disable the periodic sweep that redelivers work items whose visibility lock expired
    /// without the worker that claimed them reporting completion.
    #[arg(long, env)]
    pub disable_queue_redelivery: bool,
}
