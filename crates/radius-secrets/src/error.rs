use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("secret {scope}/{name} was not found"))]
    NotFound { scope: String, name: String },

    #[snafu(display("secret {scope}/{name} was modified concurrently, version mismatch"))]
    Concurrency { scope: String, name: String },

    #[snafu(display("no secret value transformer is registered for output resource kind {kind:?}"))]
    UnknownTransformer { kind: String },

    #[snafu(display("failed to derive secret values from output resource {local_id:?}"))]
    Transform {
        local_id: String,
        message: String,
    },
}
