use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display(
        "output resource dependency graph has a cycle involving {local_id:?}"
    ))]
    CyclicDependency { local_id: String },

    #[snafu(display("output resource {local_id:?} depends on unknown local id {depends_on:?}"))]
    UnknownDependency { local_id: String, depends_on: String },

    #[snafu(display("no handler is registered for output resource kind {kind:?}"))]
    UnknownHandler { kind: String },

    /// A handler failure that is expected to succeed on retry (a transient network error, a
    /// not-yet-ready dependency, a rate limit). The worker redelivers the queue message rather
    /// than failing the operation outright.
    #[snafu(display("handler for {local_id:?} failed transiently: {message}"))]
    HandlerTransient { local_id: String, message: String },

    /// A handler failure that will not succeed on retry (invalid input, a resource that was
    /// deleted out of band). The worker fails the operation immediately.
    #[snafu(display("handler for {local_id:?} failed permanently: {message}"))]
    HandlerPermanent { local_id: String, message: String },
}

impl Error {
    /// Whether retrying the same deploy/delete call might succeed, as opposed to a failure
    /// that will recur every time.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::HandlerTransient { .. })
    }
}
