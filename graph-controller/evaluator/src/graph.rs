//! Derives nodes and edges from the evaluation pass.

use crate::cluster::{ClusterEvaluation, PolicySet, Selections};
use netgraph_controller_core::{Edge, EdgeEvidence, Node};
use std::collections::BTreeSet;

/// Builds one node per workload and an edge for every permitted ordered pair of
/// distinct workloads.
///
/// Nodes follow the evaluation's workload order; edges are emitted with the
/// source in the outer loop and the target in the inner loop.
pub fn build(eval: &ClusterEvaluation<'_, '_>, evidence: bool) -> (Vec<Node>, Vec<Edge>) {
    (nodes(eval), edges(eval, evidence))
}

pub fn nodes(eval: &ClusterEvaluation<'_, '_>) -> Vec<Node> {
    eval.workloads()
        .map(|(workload, selections)| {
            let policy_ids = selections
                .selected_ingress
                .iter()
                .chain(selections.selected_egress.iter())
                .copied()
                .collect::<BTreeSet<_>>();
            Node {
                id: workload.id.clone(),
                name: workload.name.clone(),
                cluster: workload.cluster_name.clone(),
                namespace: workload.namespace.clone(),
                internet_access: selections.internet_access,
                policy_ids: policy_ids.into_iter().map(Into::into).collect(),
            }
        })
        .collect()
}

pub fn edges(eval: &ClusterEvaluation<'_, '_>, evidence: bool) -> Vec<Edge> {
    let mut edges = Vec::new();
    for (src, src_sel) in eval.workloads() {
        for (dst, dst_sel) in eval.workloads() {
            if src.id == dst.id || !permitted(src_sel, dst_sel) {
                continue;
            }

            edges.push(Edge {
                source: src.id.clone(),
                target: dst.id.clone(),
                evidence: evidence.then(|| explain(src_sel, dst_sel)),
            });
        }
    }
    edges
}

/// Indicates whether `src` may open connections to `dst`.
///
/// An egress-restricted source needs one of its selecting policies to admit
/// the target; an ingress-restricted target needs one of its selecting
/// policies to admit the source.
pub fn permitted(src: &Selections<'_>, dst: &Selections<'_>) -> bool {
    let egress_allowed = src.selected_egress.is_empty()
        || intersects(&src.selected_egress, &dst.matched_egress);
    let ingress_allowed = dst.selected_ingress.is_empty()
        || intersects(&dst.selected_ingress, &src.matched_ingress);
    egress_allowed && ingress_allowed
}

fn explain(src: &Selections<'_>, dst: &Selections<'_>) -> EdgeEvidence {
    EdgeEvidence {
        ingress_policy_ids: intersection(&dst.selected_ingress, &src.matched_ingress),
        egress_policy_ids: intersection(&src.selected_egress, &dst.matched_egress),
    }
}

fn intersects(a: &PolicySet<'_>, b: &PolicySet<'_>) -> bool {
    a.iter().any(|id| b.contains(id))
}

fn intersection(a: &PolicySet<'_>, b: &PolicySet<'_>) -> Vec<String> {
    a.iter()
        .filter(|id| b.contains(*id))
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(Into::into)
        .collect()
}
