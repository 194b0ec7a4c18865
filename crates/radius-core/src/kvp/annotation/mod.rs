//! This module provides various types and functions to construct valid Kubernetes
//! annotations. Annotations are key/value pairs, where the key must meet certain
//! requirementens regarding length and character set. The value can contain
//! **any** valid UTF-8 data.
//!
//! See <https://kubernetes.io/docs/concepts/overview/working-with-objects/annotations/>
//! for more information on Kubernetes annotations.
use std::convert::Infallible;

use crate::kvp::{KeyValuePair, KeyValuePairError, KeyValuePairs};

mod value;

pub use value::*;

/// A type alias for errors returned when construction or manipulation of a set
/// of annotations fails.
pub type AnnotationError = KeyValuePairError<Infallible>;

/// A specialized implementation of a key/value pair representing Kubernetes
/// annotations.
///
/// The validation of the annotation value can **never** fail, as [`str`] is
/// guaranteed  to only contain valid UTF-8 data - which is the only
/// requirement for a valid Kubernetes annotation value.
///
/// See <https://kubernetes.io/docs/concepts/overview/working-with-objects/annotations/>
/// for more information on Kubernetes annotations.
pub type Annotation = KeyValuePair<AnnotationValue>;

/// A validated set/list of Kubernetes annotations.
///
/// It provides selected associated functions to manipulate the set of
/// annotations, like inserting or extending.
///
/// ## Examples
///
/// ### Converting a BTreeMap into a list of labels
///
/// ```
/// # use std::collections::BTreeMap;
/// # use radius_core::iter::TryFromIterator;
/// # use radius_core::kvp::Annotations;
/// let map = BTreeMap::from([
///     ("app.kubernetes.io/managed-by", "radius.dev_applications.core_containers"),
///     ("radius.dev/resource-id", "äbc123"),
/// ]);
///
/// let labels = Annotations::try_from_iter(map).unwrap();
/// ```
///
/// ### Creating a list of labels from an array
///
/// ```
/// # use radius_core::iter::TryFromIterator;
/// # use radius_core::kvp::Annotations;
/// let labels = Annotations::try_from_iter([
///     ("app.kubernetes.io/managed-by", "radius.dev_applications.core_containers"),
///     ("radius.dev/resource-id", "äbc123"),
/// ]).unwrap();
/// ```
pub type Annotations = KeyValuePairs<AnnotationValue>;

/// Well-known annotations used by other tools or standard conventions.
pub mod well_known {
    use crate::kvp::{Annotation, AnnotationError};

    /// Constructs a `radius.dev/resource-id` annotation tagging an object with the fully
    /// qualified id of the tracked resource that owns it. Annotations are used instead of
    /// the equivalent label where the id may exceed the 63-character label value limit.
    pub fn resource_id(resource_id: &str) -> Result<Annotation, AnnotationError> {
        Annotation::try_from(("radius.dev/resource-id", resource_id))
    }
}
