use crate::{
    ClusterRef, ConversionError, DaemonSet, Deployment, Resource, ResourceExt, StatefulSet,
};
use k8s_openapi::api::core::v1::PodTemplateSpec;
use netgraph_controller_core::{Labels, Workload};

/// A workload resource that manages pods through a template.
pub trait PodTemplated: Resource<DynamicType = ()> {
    fn pod_template(&self) -> Option<&PodTemplateSpec>;
}

/// Converts a workload resource into a graph workload.
///
/// The workload is labeled with its pod template's labels, since those are
/// what policy selectors match in practice. Objects without a template fall
/// back to their own labels.
pub fn workload<T: PodTemplated>(
    cluster: &ClusterRef,
    resource: &T,
) -> Result<Workload, ConversionError> {
    let (namespace, id) = crate::namespaced_identity(resource)?;
    let labels = resource
        .pod_template()
        .and_then(|t| t.metadata.as_ref())
        .and_then(|m| m.labels.clone())
        .or_else(|| resource.meta().labels.clone());
    Ok(Workload {
        id,
        name: resource.name_unchecked(),
        cluster_id: cluster.id.clone(),
        cluster_name: cluster.name.clone(),
        namespace,
        labels: Labels::from(labels),
    })
}

impl PodTemplated for Deployment {
    fn pod_template(&self) -> Option<&PodTemplateSpec> {
        self.spec.as_ref().map(|s| &s.template)
    }
}

impl PodTemplated for StatefulSet {
    fn pod_template(&self) -> Option<&PodTemplateSpec> {
        self.spec.as_ref().map(|s| &s.template)
    }
}

impl PodTemplated for DaemonSet {
    fn pod_template(&self) -> Option<&PodTemplateSpec> {
        self.spec.as_ref().map(|s| &s.template)
    }
}
