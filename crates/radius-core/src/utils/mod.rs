pub mod option;
pub mod signal;

pub use self::option::OptionExt;

/// Returns the fully qualified controller name, which should be used when a single controller needs to be referred to uniquely.
///
/// `namespace` should be a provider namespace (for example: `Applications.Core`).
/// `resource_type` should typically be the lower-case version of the resource type the
/// controller manages (for example: `containers`).
pub(crate) fn format_full_controller_name(namespace: &str, resource_type: &str) -> String {
    format!("{namespace}_{resource_type}")
}
