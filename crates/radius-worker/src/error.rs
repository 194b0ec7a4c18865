use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to load the resource to deploy"))]
    Store { source: radius_store::Error },

    #[snafu(display("failed to render the resource"))]
    Render { source: radius_render::Error },

    #[snafu(display("failed to apply the rendered output resources"))]
    Process { source: radius_processor::Error },

    #[snafu(display("failed to update the async operation record"))]
    Operation { source: radius_async_ops::Error },
}

impl Error {
    /// Whether the worker should leave the queue message alone (letting the visibility lock
    /// expire for redelivery) rather than finishing it and failing the operation outright.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Process { source } if source.is_transient())
    }
}
