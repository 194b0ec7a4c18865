use k8s_openapi::{
    api::policy::v1::{PodDisruptionBudget, PodDisruptionBudgetSpec},
    apimachinery::pkg::{
        apis::meta::v1::{LabelSelector, ObjectMeta},
        util::intstr::IntOrString,
    },
};

/// This builder is used to construct [`PodDisruptionBudget`]s.
///
/// The following attributes on a [`PodDisruptionBudget`] are considered mandatory and must be specified
/// before being able to construct the [`PodDisruptionBudget`]:
///
/// 1. [`PodDisruptionBudget::metadata`]
/// 2. [`PodDisruptionBudgetSpec::selector`]
/// 3. Either [`PodDisruptionBudgetSpec::min_available`] or [`PodDisruptionBudgetSpec::max_unavailable`]
#[derive(Debug, Default)]
pub struct PodDisruptionBudgetBuilder<ObjectMeta, LabelSelector, PodDisruptionBudgetConstraint> {
    metadata: ObjectMeta,
    selector: LabelSelector,
    /// Tracks wether either `maxUnavailable` or `minAvailable` is set.
    constraint: Option<PodDisruptionBudgetConstraint>,
}

/// We intentionally only support fixed numbers, no percentage, see ADR 30 on Pod disruptions for details.
/// We use u16, as [`IntOrString`] takes an i32 and we don't want to allow negative numbers. u16 will always fit in i32.
#[derive(Debug)]
pub enum PodDisruptionBudgetConstraint {
    MaxUnavailable(u16),
    MinAvailable(u16),
}

impl PodDisruptionBudgetBuilder<(), (), ()> {
    pub fn new() -> Self {
        PodDisruptionBudgetBuilder::default()
    }

    /// Sets the mandatory [`PodDisruptionBudget::metadata`].
    pub fn new_with_metadata(
        self,
        metadata: impl Into<ObjectMeta>,
    ) -> PodDisruptionBudgetBuilder<ObjectMeta, (), ()> {
        PodDisruptionBudgetBuilder {
            metadata: metadata.into(),
            ..PodDisruptionBudgetBuilder::default()
        }
    }
}

impl PodDisruptionBudgetBuilder<ObjectMeta, (), ()> {
    /// Sets the mandatory [`PodDisruptionBudgetSpec::selector`].
    pub fn with_selector(
        self,
        selector: LabelSelector,
    ) -> PodDisruptionBudgetBuilder<ObjectMeta, LabelSelector, ()> {
        PodDisruptionBudgetBuilder {
            metadata: self.metadata,
            selector,
            constraint: self.constraint,
        }
    }
}

impl PodDisruptionBudgetBuilder<ObjectMeta, LabelSelector, ()> {
    /// Sets the mandatory [`PodDisruptionBudgetSpec::max_unavailable`].
    /// Mutually exclusive with [`PodDisruptionBudgetBuilder::with_min_available`].
    pub fn with_max_unavailable(
        self,
        max_unavailable: u16,
    ) -> PodDisruptionBudgetBuilder<ObjectMeta, LabelSelector, PodDisruptionBudgetConstraint> {
        PodDisruptionBudgetBuilder {
            metadata: self.metadata,
            selector: self.selector,
            constraint: Some(PodDisruptionBudgetConstraint::MaxUnavailable(
                max_unavailable,
            )),
        }
    }

    /// Sets the mandatory [`PodDisruptionBudgetSpec::min_available`].
    /// Mutually exclusive with [`PodDisruptionBudgetBuilder::with_max_unavailable`].
    #[deprecated(
        since = "0.51.0",
        note = "It is strongly recommended to use [`max_unavailable`]. Please read the ADR on Pod disruptions before using this function."
    )]
    pub fn with_min_available(
        self,
        min_available: u16,
    ) -> PodDisruptionBudgetBuilder<ObjectMeta, LabelSelector, PodDisruptionBudgetConstraint> {
        PodDisruptionBudgetBuilder {
            metadata: self.metadata,
            selector: self.selector,
            constraint: Some(PodDisruptionBudgetConstraint::MinAvailable(min_available)),
        }
    }
}

impl PodDisruptionBudgetBuilder<ObjectMeta, LabelSelector, PodDisruptionBudgetConstraint> {
    /// This function can be called after [`PodDisruptionBudget::metadata`], [`PodDisruptionBudgetSpec::selector`]
    /// and either [`PodDisruptionBudgetSpec::min_available`] or [`PodDisruptionBudgetSpec::max_unavailable`] are set.
    pub fn build(self) -> PodDisruptionBudget {
        let (max_unavailable, min_available) = match self.constraint {
            Some(PodDisruptionBudgetConstraint::MaxUnavailable(max_unavailable)) => {
                (Some(max_unavailable), None)
            }
            Some(PodDisruptionBudgetConstraint::MinAvailable(min_unavailable)) => {
                (None, Some(min_unavailable))
            }
            None => {
                unreachable!("Either minUnavailable or maxUnavailable must be set at this point!")
            }
        };
        PodDisruptionBudget {
            metadata: self.metadata,
            spec: Some(PodDisruptionBudgetSpec {
                max_unavailable: max_unavailable.map(i32::from).map(IntOrString::Int),
                min_available: min_available.map(i32::from).map(IntOrString::Int),
                selector: Some(self.selector),
                // Because this feature is still in beta in k8s version 1.27, the builder currently does not offer this attribute.
                unhealthy_pod_eviction_policy: Default::default(),
            }),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use k8s_openapi::{
        api::policy::v1::{PodDisruptionBudget, PodDisruptionBudgetSpec},
        apimachinery::pkg::{apis::meta::v1::LabelSelector, util::intstr::IntOrString},
    };
    use kube::core::ObjectMeta;

    use super::*;
    use crate::builder::meta::ObjectMetaBuilder;

    #[test]
    pub fn normal_build() {
        #[allow(deprecated)]
        let pdb = PodDisruptionBudgetBuilder::new()
            .new_with_metadata(
                ObjectMetaBuilder::new()
                    .namespace("default")
                    .name("trino")
                    .build(),
            )
            .with_selector(LabelSelector {
                match_expressions: None,
                match_labels: Some(BTreeMap::from([("foo".to_string(), "bar".to_string())])),
            })
            .with_min_available(42)
            .build();

        assert_eq!(pdb, PodDisruptionBudget {
            metadata: ObjectMeta {
                name: Some("trino".to_string()),
                namespace: Some("default".to_string()),
                ..Default::default()
            },
            spec: Some(PodDisruptionBudgetSpec {
                min_available: Some(IntOrString::Int(42)),
                selector: Some(LabelSelector {
                    match_expressions: None,
                    match_labels: Some(BTreeMap::from([("foo".to_string(), "bar".to_string())])),
                }),
                ..Default::default()
            }),
            ..Default::default()
        })
    }
}
