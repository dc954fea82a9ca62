use crate::SharedIndex;
use anyhow::Result;
use netgraph_controller_core::{
    Namespace, NamespaceStore, NetworkPolicy, NetworkPolicyStore, Query, Workload, WorkloadStore,
};

/// Serves snapshots of an [`Index`](crate::Index) through the store
/// capabilities.
///
/// Lists are sorted so that repeated reads of unchanged state are identical.
#[derive(Clone, Debug)]
pub struct Stores(SharedIndex);

// === impl Stores ===

impl Stores {
    pub fn new(index: SharedIndex) -> Self {
        Self(index)
    }
}

#[async_trait::async_trait]
impl WorkloadStore for Stores {
    async fn search_workloads(&self, query: &Query) -> Result<Vec<Workload>> {
        let mut workloads = {
            let index = self.0.read();
            index
                .workloads()
                .map(|(_, w)| w)
                .filter(|w| query.matches(w))
                .cloned()
                .collect::<Vec<_>>()
        };
        workloads.sort_by(|a, b| {
            (&a.namespace, &a.name, &a.id).cmp(&(&b.namespace, &b.name, &b.id))
        });
        Ok(workloads)
    }
}

#[async_trait::async_trait]
impl NamespaceStore for Stores {
    async fn list_namespaces(&self, cluster_id: &str) -> Result<Vec<Namespace>> {
        let mut namespaces = {
            let index = self.0.read();
            if index.cluster().id != cluster_id {
                return Ok(vec![]);
            }
            index.namespaces().cloned().collect::<Vec<_>>()
        };
        namespaces.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(namespaces)
    }
}

#[async_trait::async_trait]
impl NetworkPolicyStore for Stores {
    async fn list_network_policies(&self, cluster_id: &str) -> Result<Vec<NetworkPolicy>> {
        let mut policies = {
            let index = self.0.read();
            if index.cluster().id != cluster_id {
                return Ok(vec![]);
            }
            index.network_policies().cloned().collect::<Vec<_>>()
        };
        policies.sort_by(|a, b| (&a.namespace, &a.name).cmp(&(&b.namespace, &b.name)));
        Ok(policies)
    }
}
