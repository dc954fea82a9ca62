use crate::{ClusterRef, ResourceExt};
use netgraph_controller_core::Namespace;

pub fn namespace(cluster: &ClusterRef, ns: &crate::Namespace) -> Namespace {
    Namespace {
        name: ns.name_unchecked(),
        cluster_id: cluster.id.clone(),
        labels: ns.metadata.labels.clone().into(),
    }
}
