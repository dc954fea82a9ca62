use ahash::AHashMap as HashMap;
use netgraph_controller_core::{Namespace, NetworkPolicy, SharedEpoch, Workload};
use netgraph_controller_k8s_api::{self as k8s, ClusterRef, PodTemplated, ResourceExt};
use parking_lot::RwLock;
use std::{collections::hash_map::Entry, hash::Hash, sync::Arc};
use tracing::{debug, trace, warn};

pub type SharedIndex = Arc<RwLock<Index>>;

/// Holds the workloads, namespaces, and network policies of a single cluster.
#[derive(Debug)]
pub struct Index {
    cluster: ClusterRef,
    epoch: SharedEpoch,
    workloads: HashMap<WorkloadRef, Workload>,
    namespaces: HashMap<String, Namespace>,
    policies: HashMap<ResourceId, NetworkPolicy>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WorkloadKind {
    Deployment,
    StatefulSet,
    DaemonSet,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ResourceId {
    namespace: String,
    name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct WorkloadRef {
    kind: WorkloadKind,
    id: ResourceId,
}

// === impl Index ===

impl Index {
    pub fn shared(cluster: ClusterRef, epoch: SharedEpoch) -> SharedIndex {
        Arc::new(RwLock::new(Self {
            cluster,
            epoch,
            workloads: HashMap::default(),
            namespaces: HashMap::default(),
            policies: HashMap::default(),
        }))
    }

    pub fn cluster(&self) -> &ClusterRef {
        &self.cluster
    }

    pub fn epoch(&self) -> u64 {
        self.epoch.load()
    }

    pub(crate) fn workloads(&self) -> impl Iterator<Item = (WorkloadKind, &Workload)> {
        self.workloads.iter().map(|(r, w)| (r.kind, w))
    }

    pub(crate) fn namespaces(&self) -> impl Iterator<Item = &Namespace> {
        self.namespaces.values()
    }

    pub(crate) fn network_policies(&self) -> impl Iterator<Item = &NetworkPolicy> {
        self.policies.values()
    }

    fn changed(&self, kind: &str) {
        let epoch = self.epoch.increment();
        debug!(epoch, kind, "Cluster state changed");
    }

    fn apply_workload<T: PodTemplated>(&mut self, kind: WorkloadKind, resource: T) -> bool {
        let key = WorkloadRef {
            kind,
            id: ResourceId::of(&resource),
        };
        match k8s::workload(&self.cluster, &resource) {
            Ok(workload) => upsert(&mut self.workloads, key, workload),
            Err(error) => {
                warn!(%error, "Ignoring invalid workload");
                self.workloads.remove(&key).is_some()
            }
        }
    }

    fn delete_workload(&mut self, kind: WorkloadKind, namespace: String, name: String) -> bool {
        let key = WorkloadRef {
            kind,
            id: ResourceId { namespace, name },
        };
        self.workloads.remove(&key).is_some()
    }

    fn apply_network_policy(&mut self, resource: k8s::NetworkPolicy) -> bool {
        let id = ResourceId::of(&resource);
        match k8s::network_policy(&self.cluster, &resource) {
            Ok(policy) => upsert(&mut self.policies, id, policy),
            Err(error) => {
                warn!(
                    %error,
                    namespace = %id.namespace,
                    name = %id.name,
                    "Ignoring invalid network policy",
                );
                self.policies.remove(&id).is_some()
            }
        }
    }

    fn apply_namespace(&mut self, resource: k8s::Namespace) -> bool {
        let ns = k8s::namespace(&self.cluster, &resource);
        upsert(&mut self.namespaces, ns.name.clone(), ns)
    }

    /// Applies a batch of updates, recording at most one change.
    fn batch(&mut self, kind: &str, f: impl FnOnce(&mut Self) -> bool) {
        if f(self) {
            self.changed(kind);
        }
    }
}

impl kubert::index::IndexNamespacedResource<k8s::Deployment> for Index {
    fn apply(&mut self, resource: k8s::Deployment) {
        trace!(name = %resource.name_unchecked(), "Applying deployment");
        self.batch("Deployment", |idx| {
            idx.apply_workload(WorkloadKind::Deployment, resource)
        });
    }

    fn delete(&mut self, namespace: String, name: String) {
        self.batch("Deployment", |idx| {
            idx.delete_workload(WorkloadKind::Deployment, namespace, name)
        });
    }

    fn reset(
        &mut self,
        resources: Vec<k8s::Deployment>,
        removed: kubert::index::NamespacedRemoved,
    ) {
        self.batch("Deployment", |idx| {
            reset_workloads(idx, WorkloadKind::Deployment, resources, removed)
        });
    }
}

impl kubert::index::IndexNamespacedResource<k8s::StatefulSet> for Index {
    fn apply(&mut self, resource: k8s::StatefulSet) {
        trace!(name = %resource.name_unchecked(), "Applying statefulset");
        self.batch("StatefulSet", |idx| {
            idx.apply_workload(WorkloadKind::StatefulSet, resource)
        });
    }

    fn delete(&mut self, namespace: String, name: String) {
        self.batch("StatefulSet", |idx| {
            idx.delete_workload(WorkloadKind::StatefulSet, namespace, name)
        });
    }

    fn reset(
        &mut self,
        resources: Vec<k8s::StatefulSet>,
        removed: kubert::index::NamespacedRemoved,
    ) {
        self.batch("StatefulSet", |idx| {
            reset_workloads(idx, WorkloadKind::StatefulSet, resources, removed)
        });
    }
}

impl kubert::index::IndexNamespacedResource<k8s::DaemonSet> for Index {
    fn apply(&mut self, resource: k8s::DaemonSet) {
        trace!(name = %resource.name_unchecked(), "Applying daemonset");
        self.batch("DaemonSet", |idx| {
            idx.apply_workload(WorkloadKind::DaemonSet, resource)
        });
    }

    fn delete(&mut self, namespace: String, name: String) {
        self.batch("DaemonSet", |idx| {
            idx.delete_workload(WorkloadKind::DaemonSet, namespace, name)
        });
    }

    fn reset(
        &mut self,
        resources: Vec<k8s::DaemonSet>,
        removed: kubert::index::NamespacedRemoved,
    ) {
        self.batch("DaemonSet", |idx| {
            reset_workloads(idx, WorkloadKind::DaemonSet, resources, removed)
        });
    }
}

impl kubert::index::IndexNamespacedResource<k8s::NetworkPolicy> for Index {
    fn apply(&mut self, resource: k8s::NetworkPolicy) {
        trace!(name = %resource.name_unchecked(), "Applying network policy");
        self.batch("NetworkPolicy", |idx| idx.apply_network_policy(resource));
    }

    fn delete(&mut self, namespace: String, name: String) {
        self.batch("NetworkPolicy", |idx| {
            idx.policies
                .remove(&ResourceId { namespace, name })
                .is_some()
        });
    }

    fn reset(
        &mut self,
        resources: Vec<k8s::NetworkPolicy>,
        removed: kubert::index::NamespacedRemoved,
    ) {
        self.batch("NetworkPolicy", |idx| {
            let mut changed = false;
            for resource in resources {
                changed |= idx.apply_network_policy(resource);
            }
            for (namespace, names) in removed {
                for name in names {
                    let id = ResourceId {
                        namespace: namespace.clone(),
                        name,
                    };
                    changed |= idx.policies.remove(&id).is_some();
                }
            }
            changed
        });
    }
}

impl kubert::index::IndexClusterResource<k8s::Namespace> for Index {
    fn apply(&mut self, resource: k8s::Namespace) {
        trace!(name = %resource.name_unchecked(), "Applying namespace");
        self.batch("Namespace", |idx| idx.apply_namespace(resource));
    }

    fn delete(&mut self, name: String) {
        self.batch("Namespace", |idx| idx.namespaces.remove(&name).is_some());
    }

    fn reset(&mut self, resources: Vec<k8s::Namespace>, removed: kubert::index::ClusterRemoved) {
        self.batch("Namespace", |idx| {
            let mut changed = false;
            for resource in resources {
                changed |= idx.apply_namespace(resource);
            }
            for name in removed {
                changed |= idx.namespaces.remove(&name).is_some();
            }
            changed
        });
    }
}

fn reset_workloads<T: PodTemplated>(
    idx: &mut Index,
    kind: WorkloadKind,
    resources: Vec<T>,
    removed: kubert::index::NamespacedRemoved,
) -> bool {
    let mut changed = false;
    for resource in resources {
        changed |= idx.apply_workload(kind, resource);
    }
    for (namespace, names) in removed {
        for name in names {
            changed |= idx.delete_workload(kind, namespace.clone(), name);
        }
    }
    changed
}

/// Inserts `value`, returning whether the map changed.
fn upsert<K: Eq + Hash, V: PartialEq>(map: &mut HashMap<K, V>, key: K, value: V) -> bool {
    match map.entry(key) {
        Entry::Occupied(mut entry) => {
            if *entry.get() == value {
                return false;
            }
            entry.insert(value);
            true
        }
        Entry::Vacant(entry) => {
            entry.insert(value);
            true
        }
    }
}

// === impl WorkloadKind ===

impl WorkloadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deployment => "Deployment",
            Self::StatefulSet => "StatefulSet",
            Self::DaemonSet => "DaemonSet",
        }
    }
}

impl std::fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.as_str().fmt(f)
    }
}

// === impl ResourceId ===

impl ResourceId {
    fn of<T: ResourceExt>(resource: &T) -> Self {
        Self {
            namespace: resource.namespace().unwrap_or_default(),
            name: resource.name_unchecked(),
        }
    }
}
