use std::collections::BTreeMap;

use k8s_openapi::{api::core::v1::ResourceRequirements, apimachinery::pkg::api::resource::Quantity};

/// Which side of a [`ResourceRequirements`] a custom resource quantity applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceRequirementsType {
    Requests,
    Limits,
}

/// A builder to build [`ResourceRequirements`] objects, as used in a container spec.
#[derive(Clone, Default)]
pub struct ResourceRequirementsBuilder {
    requests: BTreeMap<String, Quantity>,
    limits: BTreeMap<String, Quantity>,
}

impl ResourceRequirementsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cpu_request(mut self, value: impl Into<String>) -> Self {
        self.requests.insert("cpu".to_string(), Quantity(value.into()));
        self
    }

    pub fn with_cpu_limit(mut self, value: impl Into<String>) -> Self {
        self.limits.insert("cpu".to_string(), Quantity(value.into()));
        self
    }

    pub fn with_memory_request(mut self, value: impl Into<String>) -> Self {
        self.requests
            .insert("memory".to_string(), Quantity(value.into()));
        self
    }

    pub fn with_memory_limit(mut self, value: impl Into<String>) -> Self {
        self.limits
            .insert("memory".to_string(), Quantity(value.into()));
        self
    }

    /// Sets an arbitrary resource quantity (e.g. `nvidia.com/gpu`) not covered by the
    /// dedicated cpu/memory helpers above.
    pub fn with_resource(
        mut self,
        resource_type: ResourceRequirementsType,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let target = match resource_type {
            ResourceRequirementsType::Requests => &mut self.requests,
            ResourceRequirementsType::Limits => &mut self.limits,
        };
        target.insert(name.into(), Quantity(value.into()));
        self
    }

    pub fn build(&self) -> ResourceRequirements {
        ResourceRequirements {
            claims: None,
            limits: (!self.limits.is_empty()).then(|| self.limits.clone()),
            requests: (!self.requests.is_empty()).then(|| self.requests.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_requests_and_limits() {
        let resources = ResourceRequirementsBuilder::new()
            .with_cpu_request("500m")
            .with_cpu_limit("1")
            .with_memory_request("128Mi")
            .with_memory_limit("256Mi")
            .build();

        let requests = resources.requests.expect("requests to be set");
        let limits = resources.limits.expect("limits to be set");

        assert_eq!(requests.get("cpu"), Some(&Quantity("500m".to_string())));
        assert_eq!(limits.get("memory"), Some(&Quantity("256Mi".to_string())));
    }
}
