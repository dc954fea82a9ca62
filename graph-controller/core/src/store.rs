//! Capabilities through which cluster state is read.
//!
//! Each call returns an owned snapshot; implementations are responsible for
//! whatever consistency they provide across calls.

use crate::{NetworkPolicy, Namespace, Query, Workload};
use anyhow::Result;

/// Searches indexed workloads.
#[async_trait::async_trait]
pub trait WorkloadStore: Send + Sync {
    async fn search_workloads(&self, query: &Query) -> Result<Vec<Workload>>;
}

#[async_trait::async_trait]
pub trait NamespaceStore: Send + Sync {
    async fn list_namespaces(&self, cluster_id: &str) -> Result<Vec<Namespace>>;
}

#[async_trait::async_trait]
pub trait NetworkPolicyStore: Send + Sync {
    async fn list_network_policies(&self, cluster_id: &str) -> Result<Vec<NetworkPolicy>>;
}
