use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use kube::{Resource, ResourceExt};
use snafu::{OptionExt, Snafu};
use tracing::warn;

use crate::kvp::{Annotation, Annotations, Label, Labels};

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, PartialEq, Snafu)]
pub enum Error {
    #[snafu(display("object is missing key {key:?}"))]
    MissingObjectKey { key: &'static str },
}

/// A builder to build [`ObjectMeta`] objects.
///
/// Of special interest is [`Self::ownerreference_from_resource`]. Note that this builder only
/// supports a single `OwnerReference`.
#[derive(Clone, Default)]
pub struct ObjectMetaBuilder {
    name: Option<String>,
    generate_name: Option<String>,
    namespace: Option<String>,
    ownerreference: Option<OwnerReference>,
    labels: Option<Labels>,
    annotations: Option<Annotations>,
}

impl ObjectMetaBuilder {
    pub fn new() -> ObjectMetaBuilder {
        ObjectMetaBuilder::default()
    }

    /// This sets the name and namespace from a given resource.
    pub fn name_and_namespace<T: Resource>(&mut self, resource: &T) -> &mut Self {
        self.name = Some(resource.name_any());
        self.namespace = resource.namespace();
        self
    }

    pub fn name_opt(&mut self, name: impl Into<Option<String>>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn generate_name(&mut self, generate_name: impl Into<String>) -> &mut Self {
        self.generate_name = Some(generate_name.into());
        self
    }

    pub fn generate_name_opt(&mut self, generate_name: impl Into<Option<String>>) -> &mut Self {
        self.generate_name = generate_name.into();
        self
    }

    pub fn namespace_opt(&mut self, namespace: impl Into<Option<String>>) -> &mut Self {
        self.namespace = namespace.into();
        self
    }

    pub fn namespace(&mut self, namespace: impl Into<String>) -> &mut Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn ownerreference(&mut self, ownerreference: OwnerReference) -> &mut Self {
        self.ownerreference = Some(ownerreference);
        self
    }

    pub fn ownerreference_opt(&mut self, ownerreference: Option<OwnerReference>) -> &mut Self {
        self.ownerreference = ownerreference;
        self
    }

    /// Sets the `OwnerReference` to point at the given resource.
    pub fn ownerreference_from_resource<T: Resource<DynamicType = ()>>(
        &mut self,
        resource: &T,
        block_owner_deletion: Option<bool>,
        controller: Option<bool>,
    ) -> Result<&mut Self> {
        self.ownerreference = Some(
            OwnerReferenceBuilder::new()
                .initialize_from_resource(resource)
                .block_owner_deletion_opt(block_owner_deletion)
                .controller_opt(controller)
                .build()?,
        );
        Ok(self)
    }

    /// Adds a single annotation, overriding an existing annotation with the same key.
    pub fn with_annotation(&mut self, annotation: Annotation) -> &mut Self {
        self.annotations.get_or_insert_with(Annotations::new).extend([annotation]);
        self
    }

    /// Adds multiple annotations, overriding any existing annotation with the same key.
    pub fn with_annotations(&mut self, annotations: Annotations) -> &mut Self {
        self.annotations
            .get_or_insert_with(Annotations::new)
            .extend(annotations);
        self
    }

    /// Replaces all existing annotations.
    pub fn annotations(&mut self, annotations: Annotations) -> &mut Self {
        self.annotations = Some(annotations);
        self
    }

    /// Adds a single label, overriding an existing label with the same key.
    pub fn with_label(&mut self, label: Label) -> &mut Self {
        self.labels.get_or_insert_with(Labels::new).extend([label]);
        self
    }

    /// Adds multiple labels, overriding any existing label with the same key.
    pub fn with_labels(&mut self, labels: Labels) -> &mut Self {
        self.labels.get_or_insert_with(Labels::new).extend(labels);
        self
    }

    /// Replaces all existing labels.
    pub fn labels(&mut self, labels: Labels) -> &mut Self {
        self.labels = Some(labels);
        self
    }

    pub fn build(&self) -> ObjectMeta {
        if let (Some(name), Some(generate_name)) = (&self.name, &self.generate_name) {
            warn!(
                name, generate_name,
                "ObjectMeta has both 'name' and 'generate_name' set, Kubernetes will prioritize 'name'"
            );
        }

        ObjectMeta {
            generate_name: self.generate_name.clone(),
            name: self.name.clone(),
            namespace: self.namespace.clone(),
            owner_references: self
                .ownerreference
                .as_ref()
                .map(|ownerreference| vec![ownerreference.clone()]),
            labels: self
                .labels
                .as_ref()
                .map(crate::kvp::KeyValuePairsExt::to_unvalidated),
            annotations: self
                .annotations
                .as_ref()
                .map(crate::kvp::KeyValuePairsExt::to_unvalidated),
            ..ObjectMeta::default()
        }
    }
}

/// A builder to build [`OwnerReference`] objects.
///
/// Of special interest is [`Self::initialize_from_resource`].
#[derive(Clone, Default)]
pub struct OwnerReferenceBuilder {
    api_version: Option<String>,
    block_owner_deletion: Option<bool>,
    controller: Option<bool>,
    kind: Option<String>,
    name: Option<String>,
    uid: Option<String>,
}

impl OwnerReferenceBuilder {
    pub fn new() -> OwnerReferenceBuilder {
        OwnerReferenceBuilder::default()
    }

    pub fn api_version(&mut self, api_version: impl Into<String>) -> &mut Self {
        self.api_version = Some(api_version.into());
        self
    }

    pub fn api_version_opt(&mut self, api_version: impl Into<Option<String>>) -> &mut Self {
        self.api_version = api_version.into();
        self
    }

    pub fn block_owner_deletion(&mut self, block_owner_deletion: bool) -> &mut Self {
        self.block_owner_deletion = Some(block_owner_deletion);
        self
    }

    pub fn block_owner_deletion_opt(&mut self, block_owner_deletion: Option<bool>) -> &mut Self {
        self.block_owner_deletion = block_owner_deletion;
        self
    }

    pub fn controller(&mut self, controller: bool) -> &mut Self {
        self.controller = Some(controller);
        self
    }

    pub fn controller_opt(&mut self, controller: Option<bool>) -> &mut Self {
        self.controller = controller;
        self
    }

    pub fn kind(&mut self, kind: impl Into<String>) -> &mut Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn kind_opt(&mut self, kind: impl Into<Option<String>>) -> &mut Self {
        self.kind = kind.into();
        self
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn name_opt(&mut self, name: impl Into<Option<String>>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn uid(&mut self, uid: impl Into<String>) -> &mut Self {
        self.uid = Some(uid.into());
        self
    }

    pub fn uid_opt(&mut self, uid: impl Into<Option<String>>) -> &mut Self {
        self.uid = uid.into();
        self
    }

    /// Initializes the builder with settings from an existing resource. The resulting
    /// `OwnerReference` will point at the passed resource.
    ///
    /// This does _not_ set `controller` or `block_owner_deletion`.
    pub fn initialize_from_resource<T: Resource<DynamicType = ()>>(
        &mut self,
        resource: &T,
    ) -> &mut Self {
        self.api_version(T::api_version(&()))
            .kind(T::kind(&()))
            .name(resource.name_any())
            .uid_opt(resource.meta().uid.clone());
        self
    }

    pub fn build(&self) -> Result<OwnerReference> {
        Ok(OwnerReference {
            api_version: self
                .api_version
                .clone()
                .context(MissingObjectKeySnafu { key: "apiVersion" })?,
            block_owner_deletion: self.block_owner_deletion,
            controller: self.controller,
            kind: self.kind.clone().context(MissingObjectKeySnafu { key: "kind" })?,
            name: self.name.clone().context(MissingObjectKeySnafu { key: "name" })?,
            uid: self.uid.clone().context(MissingObjectKeySnafu { key: "uid" })?,
        })
    }
}
