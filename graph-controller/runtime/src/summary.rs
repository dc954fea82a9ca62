use crate::{core::Query, evaluator::Evaluator};
use prometheus_client::{metrics::gauge::Gauge, registry::Registry};
use tokio::time::{self, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Periodically evaluates the whole cluster graph and publishes its shape.
///
/// A pass is skipped when the epoch has not moved since the last published
/// graph.
pub struct Summary {
    evaluator: Evaluator,
    cluster_id: String,
    interval: Duration,
    timeout: Duration,
    metrics: SummaryMetrics,
    last_epoch: Option<u64>,
}

#[derive(Clone, Debug, Default)]
pub struct SummaryMetrics {
    nodes: Gauge,
    edges: Gauge,
    internet_exposed: Gauge,
}

// === impl Summary ===

impl Summary {
    pub fn new(
        evaluator: Evaluator,
        cluster_id: impl ToString,
        interval: Duration,
        timeout: Duration,
        metrics: SummaryMetrics,
    ) -> Self {
        Self {
            evaluator,
            cluster_id: cluster_id.to_string(),
            interval,
            timeout,
            metrics,
            last_epoch: None,
        }
    }

    /// Runs until the process begins shutting down.
    pub async fn run(mut self, drain: drain::Watch) {
        let mut interval = time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let shutdown = drain.signaled();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = &mut shutdown => {
                    debug!("Shutting down");
                    return;
                }
            }
            self.reconcile().await;
        }
    }

    /// Publishes a new summary if cluster state changed, returning whether a
    /// graph was evaluated.
    pub(crate) async fn reconcile(&mut self) -> bool {
        let epoch = self.evaluator.epoch();
        if self.last_epoch == Some(epoch) {
            debug!(epoch, "Cluster state unchanged");
            return false;
        }

        let evaluation = self
            .evaluator
            .get_graph(&self.cluster_id, Query::default());
        let graph = match time::timeout(self.timeout, evaluation).await {
            Ok(Ok(graph)) => graph,
            Ok(Err(error)) => {
                warn!(%error, "Failed to evaluate network graph");
                return true;
            }
            Err(_) => {
                warn!(timeout = ?self.timeout, "Network graph evaluation timed out");
                return true;
            }
        };

        let internet_exposed = graph.internet_exposed();
        self.metrics.nodes.set(graph.nodes.len() as i64);
        self.metrics.edges.set(graph.edges.len() as i64);
        self.metrics.internet_exposed.set(internet_exposed as i64);
        info!(
            epoch = graph.epoch,
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            internet_exposed,
            "Network graph updated"
        );

        // The graph's epoch was captured before fetching, so any change that
        // raced with this pass is picked up by the next one.
        self.last_epoch = Some(graph.epoch);
        true
    }
}

// === impl SummaryMetrics ===

impl SummaryMetrics {
    pub fn register(reg: &mut Registry) -> Self {
        let metrics = Self::default();

        reg.register(
            "graph_nodes",
            "The number of workloads in the last evaluated network graph",
            metrics.nodes.clone(),
        );

        reg.register(
            "graph_edges",
            "The number of permitted connections in the last evaluated network graph",
            metrics.edges.clone(),
        );

        reg.register(
            "graph_internet_exposed_nodes",
            "The number of workloads that may reach destinations outside of the cluster",
            metrics.internet_exposed.clone(),
        );

        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::Epoch,
        evaluator::{EvaluatorConfig, EvaluatorMetrics},
        index::{Index, SharedIndex, Stores},
        k8s::{self, ClusterRef},
    };
    use kubert::index::IndexNamespacedResource;
    use maplit::btreemap;

    fn mk_summary() -> (SharedIndex, Summary) {
        let epoch = Epoch::shared();
        let index = Index::shared(
            ClusterRef {
                id: "c1".to_string(),
                name: "local".to_string(),
            },
            epoch.clone(),
        );
        let evaluator = Evaluator::from_stores(
            Stores::new(index.clone()),
            epoch,
            EvaluatorConfig::default(),
            EvaluatorMetrics::default(),
        );
        let summary = Summary::new(
            evaluator,
            "c1",
            Duration::from_secs(10),
            Duration::from_secs(30),
            SummaryMetrics::default(),
        );
        (index, summary)
    }

    fn mk_deployment(name: &str) -> k8s::Deployment {
        k8s::Deployment {
            metadata: k8s::ObjectMeta {
                namespace: Some("ns-0".to_string()),
                name: Some(name.to_string()),
                uid: Some(format!("uid-{name}")),
                labels: Some(btreemap! { "app".to_string() => name.to_string() }),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn publishes_only_when_epoch_moves() {
        let _tracing = tracing::subscriber::set_default(
            tracing_subscriber::fmt().with_test_writer().finish(),
        );
        let (index, mut summary) = mk_summary();

        assert!(summary.reconcile().await, "first pass must evaluate");
        assert_eq!(summary.metrics.nodes.get(), 0);
        assert!(!summary.reconcile().await, "unchanged state must be skipped");

        index.write().apply(mk_deployment("web"));
        index.write().apply(mk_deployment("api"));
        assert!(summary.reconcile().await);
        assert_eq!(summary.metrics.nodes.get(), 2);
        assert_eq!(summary.metrics.edges.get(), 2);
        assert_eq!(summary.metrics.internet_exposed.get(), 2);
        assert_eq!(summary.last_epoch, Some(2));

        assert!(!summary.reconcile().await);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn failed_evaluations_are_retried() {
        let (_index, summary) = mk_summary();
        let mut summary = Summary {
            cluster_id: String::new(),
            ..summary
        };
        assert!(summary.reconcile().await);
        assert_eq!(summary.last_epoch, None);
        assert!(summary.reconcile().await, "failure must not be cached");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn stops_on_shutdown() {
        let (_index, summary) = mk_summary();
        let (signal, watch) = drain::channel();
        let task = tokio::spawn(summary.run(watch));
        signal.drain().await;
        task.await.expect("summary task must not panic");
    }
}
