//! This module provides various types and functions to construct valid
//! Kubernetes labels. Labels are key/value pairs, where the key must meet
//! certain requirementens regarding length and character set. The value can
//! contain a limited set of ASCII characters.
//!
//! Additionally, the [`Label`] struct provides various helper functions to
//! construct labels commonly applied to platform artefacts created on behalf
//! of a tracked resource, like `managed-by` or `component`.
//!
//! See <https://kubernetes.io/docs/concepts/overview/working-with-objects/labels/>
//! for more information on Kubernetes labels.

use crate::kvp::{KeyValuePair, KeyValuePairError, KeyValuePairs};

mod selector;
mod value;

pub use selector::*;
pub use value::*;

/// A type alias for errors returned when construction or manipulation of a set
/// of labels fails.
pub type LabelError = KeyValuePairError<LabelValueError>;

/// A specialized implementation of a key/value pair representing Kubernetes
/// labels.
///
/// ```
/// # use radius_core::kvp::Label;
/// let label = Label::try_from(("radius.dev/resource-id", "abc123")).unwrap();
/// assert_eq!(label.to_string(), "radius.dev/resource-id=abc123");
/// ```
///
/// The validation of the label value can fail due to multiple reasons. It can
/// only contain a limited set and combination of ASCII characters. See
/// <https://kubernetes.io/docs/concepts/overview/working-with-objects/labels/>
/// for more information on Kubernetes labels.
pub type Label = KeyValuePair<LabelValue>;

/// A validated set/list of Kubernetes labels.
///
/// It provides selected associated functions to manipulate the set of labels,
/// like inserting or extending.
///
/// ## Examples
///
/// ### Converting a BTreeMap into a list of labels
///
/// ```
/// # use std::collections::BTreeMap;
/// # use radius_core::iter::TryFromIterator;
/// # use radius_core::kvp::Labels;
/// let map = BTreeMap::from([
///     ("app.kubernetes.io/managed-by", "radius.dev_applications.core_containers"),
///     ("radius.dev/resource-id", "abc123"),
/// ]);
///
/// let labels = Labels::try_from_iter(map).unwrap();
/// ```
///
/// ### Creating a list of labels from an array
///
/// ```
/// # use radius_core::iter::TryFromIterator;
/// # use radius_core::kvp::Labels;
/// let labels = Labels::try_from_iter([
///     ("app.kubernetes.io/managed-by", "radius.dev_applications.core_containers"),
///     ("radius.dev/resource-id", "abc123"),
/// ]).unwrap();
/// ```
pub type Labels = KeyValuePairs<LabelValue>;

/// Well-known labels used by other tools or standard conventions.
pub mod well_known {
    use crate::{
        kvp::consts::{
            K8S_APP_COMPONENT_KEY, K8S_APP_MANAGED_BY_KEY, K8S_APP_VERSION_KEY,
            RADIUS_RESOURCE_ID_KEY,
        },
        utils::format_full_controller_name,
    };

    use super::{Label, LabelError};

    /// Creates the `app.kubernetes.io/component` label with `component` as the
    /// value. This function will return an error if `component` violates the required
    /// Kubernetes restrictions.
    pub fn component(component: &str) -> Result<Label, LabelError> {
        Label::try_from((K8S_APP_COMPONENT_KEY, component))
    }

    /// Creates the `app.kubernetes.io/managed-by` label with the formated
    /// full controller name based on `provider_namespace` and `resource_type` as
    /// the value. This function will return an error if the formatted controller
    /// name violates the required Kubernetes restrictions.
    pub fn managed_by(provider_namespace: &str, resource_type: &str) -> Result<Label, LabelError> {
        Label::try_from((
            K8S_APP_MANAGED_BY_KEY,
            format_full_controller_name(provider_namespace, resource_type).as_str(),
        ))
    }

    /// Creates the `app.kubernetes.io/version` label with `version` as the
    /// value. This function will return an error if `version` violates the
    /// required Kubernetes restrictions.
    pub fn version(version: &str) -> Result<Label, LabelError> {
        Label::try_from((K8S_APP_VERSION_KEY, version))
    }

    /// Creates the `radius.dev/resource-id` label tagging the object with the fully
    /// qualified id of the tracked resource that owns it.
    pub fn resource_id(resource_id: &str) -> Result<Label, LabelError> {
        Label::try_from((RADIUS_RESOURCE_ID_KEY, resource_id))
    }
}

/// Common sets of labels that apply for different use-cases.
pub mod sets {
    use kube::{Resource, ResourceExt};

    use crate::kvp::{
        consts::{K8S_APP_INSTANCE_KEY, K8S_APP_NAME_KEY},
        ObjectLabels,
    };

    use super::{well_known, Label, LabelError, Labels};

    /// Returns the recommended set of labels to apply to an output resource rendered on
    /// behalf of a tracked resource. The set includes these well-known Kubernetes labels:
    ///
    /// - `app.kubernetes.io/instance`
    /// - `app.kubernetes.io/name`
    /// - `app.kubernetes.io/component`
    /// - `app.kubernetes.io/managed-by`
    /// - `app.kubernetes.io/version`
    /// - `radius.dev/resource-id`
    ///
    /// This function returns a result, because the parameter `object_labels`
    /// can contain invalid data or can exceed the maximum allowed number of
    /// characters.
    pub fn recommended<R>(object_labels: ObjectLabels<R>) -> Result<Labels, LabelError>
    where
        R: Resource,
    {
        let mut labels = common(object_labels.app_name, object_labels.owner.name_any().as_str())?;

        labels.extend([
            well_known::component(object_labels.component_name)?,
            well_known::managed_by(object_labels.provider_namespace, object_labels.resource_type)?,
            well_known::version(object_labels.app_version)?,
            well_known::resource_id(object_labels.resource_id)?,
        ]);

        Ok(labels)
    }

    /// Returns a common set of labels, which are required to identify resources
    /// that belong to a certain owner resource.
    /// The set contains these well-known labels:
    ///
    /// - `app.kubernetes.io/instance` and
    /// - `app.kubernetes.io/name`
    ///
    /// This function returns a result, because the parameters `app_name` and
    /// `app_instance` can contain invalid data or can exceed the maximum
    /// allowed number of characters.
    pub fn common(app_name: &str, app_instance: &str) -> Result<Labels, LabelError> {
        Ok(Labels::from_iter([
            Label::try_from((K8S_APP_INSTANCE_KEY, app_instance))?,
            Label::try_from((K8S_APP_NAME_KEY, app_name))?,
        ]))
    }
}
