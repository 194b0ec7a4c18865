use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("no renderer is registered for resource type {resource_type:?}"))]
    UnknownResourceType { resource_type: String },

    #[snafu(display("resource properties are missing required field {field:?}"))]
    MissingProperty { field: &'static str },

    #[snafu(display("resource property {field:?} has an unexpected shape"))]
    InvalidProperty { field: &'static str },

    #[snafu(display("failed to construct a Kubernetes label or selector"))]
    Label { source: radius_core::kvp::LabelError },

    #[snafu(display("dependency {resource_id} was not resolved before rendering"))]
    MissingDependency { resource_id: String },
}
