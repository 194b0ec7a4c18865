//! Orders a set of output resources by their declared dependencies.
//!
//! Uses Kahn's algorithm over an [`IndexMap`]-backed arena so iteration (and therefore the
//! resulting order whenever several resources become ready at once) is deterministic: ties are
//! broken lexicographically by `local_id` rather than by arbitrary hash order, so the same
//! input always produces the same apply/delete order and never causes spurious reconciles.

use std::collections::{BTreeSet, VecDeque};

use indexmap::IndexMap;
use radius_store::OutputResource;

use crate::error::{CyclicDependencySnafu, Result, UnknownDependencySnafu};
use snafu::ensure;

/// Returns `local_id`s in dependency order: every resource appears after all of the resources
/// it depends on.
pub fn topological_order(resources: &[OutputResource]) -> Result<Vec<String>> {
    let mut in_degree: IndexMap<&str, usize> = IndexMap::new();
    let mut dependents: IndexMap<&str, Vec<&str>> = IndexMap::new();

    for resource in resources {
        in_degree.entry(&resource.local_id).or_insert(0);
        dependents.entry(&resource.local_id).or_default();
    }

    for resource in resources {
        for dependency in &resource.dependencies {
            ensure!(
                in_degree.contains_key(dependency.as_str()),
                UnknownDependencySnafu {
                    local_id: resource.local_id.clone(),
                    depends_on: dependency.clone(),
                }
            );
            *in_degree.get_mut(resource.local_id.as_str()).unwrap() += 1;
            dependents
                .get_mut(dependency.as_str())
                .unwrap()
                .push(&resource.local_id);
        }
    }

    let mut ready: BTreeSet<&str> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(id, _)| *id)
        .collect();
    let mut remaining = in_degree.clone();
    let mut order = Vec::with_capacity(resources.len());
    let mut queue: VecDeque<&str> = VecDeque::new();

    while !ready.is_empty() || !queue.is_empty() {
        let next = if let Some(next) = queue.pop_front() {
            next
        } else {
            let next = *ready.iter().next().unwrap();
            ready.remove(next);
            next
        };

        order.push(next.to_string());

        for dependent in &dependents[next] {
            let degree = remaining.get_mut(dependent).unwrap();
            *degree -= 1;
            if *degree == 0 {
                ready.insert(dependent);
            }
        }
    }

    ensure!(
        order.len() == resources.len(),
        CyclicDependencySnafu {
            local_id: resources
                .first()
                .map(|r| r.local_id.clone())
                .unwrap_or_default(),
        }
    );

    Ok(order)
}

#[cfg(test)]
mod tests {
    use radius_store::model::OutputResourceProvider;

    use super::*;

    fn resource(local_id: &str, dependencies: &[&str]) -> OutputResource {
        OutputResource {
            local_id: local_id.to_string(),
            kind: "test".to_string(),
            provider: OutputResourceProvider::Kubernetes,
            identity: local_id.to_string(),
            persisted_properties: serde_json::Map::new(),
            dependencies: dependencies.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn independent_resources_sort_lexicographically() {
        let resources = vec![resource("b", &[]), resource("a", &[])];
        let order = topological_order(&resources).unwrap();
        assert_eq!(order, vec!["a", "b"]);
    }

    #[test]
    fn dependents_follow_their_dependencies() {
        let resources = vec![resource("service", &["deployment"]), resource("deployment", &[])];
        let order = topological_order(&resources).unwrap();
        assert_eq!(order, vec!["deployment", "service"]);
    }

    #[test]
    fn diamond_dependency_resolves_once() {
        let resources = vec![
            resource("d", &["b", "c"]),
            resource("b", &["a"]),
            resource("c", &["a"]),
            resource("a", &[]),
        ];
        let order = topological_order(&resources).unwrap();
        assert_eq!(order, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn cycle_is_rejected() {
        let resources = vec![resource("a", &["b"]), resource("b", &["a"])];
        let err = topological_order(&resources).unwrap_err();
        assert!(matches!(err, crate::error::Error::CyclicDependency { .. }));
    }

    #[test]
    fn dependency_on_unknown_local_id_is_rejected() {
        let resources = vec![resource("a", &["missing"])];
        let err = topological_order(&resources).unwrap_err();
        assert!(matches!(err, crate::error::Error::UnknownDependency { .. }));
    }
}
