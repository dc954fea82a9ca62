use crate::{cluster, graph, EvaluatorMetrics, GraphError, NamespaceLookup, Resource};
use netgraph_controller_core::{
    Graph, NamespaceStore, NetworkPolicyStore, Query, SharedEpoch, WorkloadStore,
};
use std::{sync::Arc, time::Instant};
use tracing::{debug, info, instrument};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EvaluatorConfig {
    /// Attaches the policies that permit each edge to the edge.
    pub edge_evidence: bool,
}

/// Computes network graphs from the current state of the stores.
///
/// The evaluator holds no graph state between calls. The epoch is the only
/// state shared across calls; it is incremented by whatever detects changes to
/// the stores.
#[derive(Clone)]
pub struct Evaluator {
    workloads: Arc<dyn WorkloadStore>,
    namespaces: Arc<dyn NamespaceStore>,
    policies: Arc<dyn NetworkPolicyStore>,
    epoch: SharedEpoch,
    config: EvaluatorConfig,
    metrics: EvaluatorMetrics,
}

// === impl Evaluator ===

impl Evaluator {
    pub fn new(
        workloads: Arc<dyn WorkloadStore>,
        namespaces: Arc<dyn NamespaceStore>,
        policies: Arc<dyn NetworkPolicyStore>,
        epoch: SharedEpoch,
        config: EvaluatorConfig,
        metrics: EvaluatorMetrics,
    ) -> Self {
        Self {
            workloads,
            namespaces,
            policies,
            epoch,
            config,
            metrics,
        }
    }

    /// Builds an evaluator backed by a single type that implements every store.
    pub fn from_stores<S>(
        stores: S,
        epoch: SharedEpoch,
        config: EvaluatorConfig,
        metrics: EvaluatorMetrics,
    ) -> Self
    where
        S: WorkloadStore + NamespaceStore + NetworkPolicyStore + 'static,
    {
        let stores = Arc::new(stores);
        Self::new(
            stores.clone(),
            stores.clone(),
            stores,
            epoch,
            config,
            metrics,
        )
    }

    /// The current epoch.
    pub fn epoch(&self) -> u64 {
        self.epoch.load()
    }

    /// Records a change to cluster state.
    pub fn increment_epoch(&self) -> u64 {
        self.epoch.increment()
    }

    /// Computes the graph of workloads in `cluster_id` that match `query`.
    ///
    /// The returned graph is stamped with the epoch observed before any state
    /// was fetched. Either a complete graph is returned or an error; a failed
    /// fetch discards all work.
    #[instrument(skip(self, query))]
    pub async fn get_graph(&self, cluster_id: &str, query: Query) -> Result<Graph, GraphError> {
        let start = Instant::now();
        let result = self.evaluate(cluster_id, query).await;
        self.metrics.observe(&result, start.elapsed());
        result
    }

    async fn evaluate(&self, cluster_id: &str, query: Query) -> Result<Graph, GraphError> {
        if cluster_id.is_empty() {
            return Err(GraphError::MissingClusterId);
        }

        let epoch = self.epoch.load();

        let policies = self
            .policies
            .list_network_policies(cluster_id)
            .await
            .map_err(GraphError::fetch(Resource::NetworkPolicies, cluster_id))?;
        let namespaces = self
            .namespaces
            .list_namespaces(cluster_id)
            .await
            .map_err(GraphError::fetch(Resource::Namespaces, cluster_id))?;
        let workloads = self
            .workloads
            .search_workloads(&query.scoped_to_cluster(cluster_id))
            .await
            .map_err(GraphError::fetch(Resource::Workloads, cluster_id))?;

        let namespaces = NamespaceLookup::new(&namespaces);
        let evaluation = cluster::evaluate(&workloads, &policies, &namespaces);
        if evaluation.has_unsupported_policies() {
            let ids = evaluation.unsupported_policies().collect::<Vec<_>>();
            info!(
                policies = ?ids,
                "IP block peers are not evaluated for workload-to-workload traffic"
            );
            self.metrics.unsupported_peer_policies(ids.len());
        }

        let (nodes, edges) = graph::build(&evaluation, self.config.edge_evidence);
        debug!(
            epoch,
            workloads = workloads.len(),
            policies = policies.len(),
            nodes = nodes.len(),
            edges = edges.len(),
            "Evaluated graph"
        );
        Ok(Graph {
            epoch,
            nodes,
            edges,
        })
    }
}

impl std::fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluator")
            .field("epoch", &self.epoch)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
