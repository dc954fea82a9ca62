use crate::GraphError;
use netgraph_controller_core::Graph;
use prometheus_client::{
    encoding::EncodeLabelSet,
    metrics::{
        counter::Counter,
        family::Family,
        histogram::{exponential_buckets, Histogram},
    },
    registry::Registry,
};
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct EvaluatorMetrics {
    evaluations: Family<ResultLabels, Counter>,
    duration: Histogram,
    unsupported_peer_policies: Counter,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct ResultLabels {
    result: &'static str,
}

// === impl EvaluatorMetrics ===

impl EvaluatorMetrics {
    pub fn register(reg: &mut Registry) -> Self {
        let metrics = Self::default();

        reg.register(
            "graph_evaluations",
            "Count of network graph evaluations by result",
            metrics.evaluations.clone(),
        );

        reg.register(
            "graph_evaluation_duration_seconds",
            "Time taken to fetch cluster state and evaluate a network graph",
            metrics.duration.clone(),
        );

        reg.register(
            "unsupported_peer_policies",
            "Count of policies with IP block peers skipped during workload matching",
            metrics.unsupported_peer_policies.clone(),
        );

        metrics
    }

    pub(crate) fn observe(&self, result: &Result<Graph, GraphError>, elapsed: Duration) {
        let result = match result {
            Ok(_) => "ok",
            Err(e) if e.is_invalid_argument() => "invalid_argument",
            Err(_) => "fetch_error",
        };
        self.evaluations
            .get_or_create(&ResultLabels { result })
            .inc();
        self.duration.observe(elapsed.as_secs_f64());
    }

    pub(crate) fn unsupported_peer_policies(&self, count: usize) {
        self.unsupported_peer_policies.inc_by(count as u64);
    }
}

impl Default for EvaluatorMetrics {
    /// Metrics that are not exported.
    fn default() -> Self {
        Self {
            evaluations: Family::default(),
            // From 1ms to ~16s.
            duration: Histogram::new(exponential_buckets(0.001, 4.0, 8)),
            unsupported_peer_policies: Counter::default(),
        }
    }
}
