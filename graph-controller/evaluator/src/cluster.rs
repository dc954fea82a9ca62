//! Classifies every workload of a cluster against every policy.

use crate::{
    applicability::{self, EgressSelection},
    peer::{self, NamespaceLookup},
};
use ahash::AHashSet as HashSet;
use netgraph_controller_core::{NetworkPolicy, Workload};
use std::collections::BTreeSet;
use tracing::warn;

/// A set of policy IDs, borrowed from the evaluated policies.
pub type PolicySet<'p> = HashSet<&'p str>;

/// The per-workload outcome of the evaluation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selections<'p> {
    /// Policies that restrict the workload's ingress.
    pub selected_ingress: PolicySet<'p>,

    /// Policies that restrict the workload's egress.
    pub selected_egress: PolicySet<'p>,

    /// Policies with an ingress rule that admits traffic from the workload.
    pub matched_ingress: PolicySet<'p>,

    /// Policies with an egress rule that admits traffic to the workload.
    pub matched_egress: PolicySet<'p>,

    /// Set when no policy restricts the workload's egress or when a restricting
    /// policy names an IP block.
    pub internet_access: bool,
}

#[derive(Debug)]
pub struct ClusterEvaluation<'w, 'p> {
    /// Workloads in the order they were provided, without duplicate IDs.
    workloads: Vec<(&'w Workload, Selections<'p>)>,

    /// Policies with IP block peers, which are not matched against workloads.
    unsupported: BTreeSet<&'p str>,
}

/// Runs the evaluation pass over a cluster's workloads and policies.
///
/// Policies without a spec are skipped. Workloads whose ID was already seen are
/// dropped.
pub fn evaluate<'w, 'p>(
    workloads: &'w [Workload],
    policies: &'p [NetworkPolicy],
    namespaces: &NamespaceLookup<'_>,
) -> ClusterEvaluation<'w, 'p> {
    let unsupported = policies
        .iter()
        .filter(|p| has_ip_block_peer(p))
        .map(|p| p.id.as_str())
        .collect();

    let mut seen = HashSet::with_capacity(workloads.len());
    let mut evaluated = Vec::with_capacity(workloads.len());
    for workload in workloads {
        if !seen.insert(workload.id.as_str()) {
            warn!(id = %workload.id, name = %workload.name, "Ignoring duplicate workload");
            continue;
        }
        evaluated.push((workload, select(workload, policies, namespaces)));
    }

    ClusterEvaluation {
        workloads: evaluated,
        unsupported,
    }
}

fn select<'p>(
    workload: &Workload,
    policies: &'p [NetworkPolicy],
    namespaces: &NamespaceLookup<'_>,
) -> Selections<'p> {
    let mut selections = Selections::default();
    let mut internet_peer = false;

    for policy in policies.iter().filter(|p| p.spec.is_some()) {
        let id = policy.id.as_str();

        if applicability::ingress_applies(workload, policy) {
            selections.selected_ingress.insert(id);
        }
        if let EgressSelection::Selected {
            internet_peer: hint,
        } = applicability::egress_applies(workload, policy)
        {
            selections.selected_egress.insert(id);
            internet_peer |= hint;
        }
        if peer::ingress_rules_match(workload, policy, namespaces) {
            selections.matched_ingress.insert(id);
        }
        if peer::egress_rules_match(workload, policy, namespaces) {
            selections.matched_egress.insert(id);
        }
    }

    // Egress is unrestricted unless some policy selects the workload for it.
    selections.internet_access = selections.selected_egress.is_empty() || internet_peer;
    selections
}

fn has_ip_block_peer(policy: &NetworkPolicy) -> bool {
    policy.spec.iter().any(|spec| {
        let from = spec.ingress.iter().flat_map(|r| r.from.iter());
        let to = spec.egress.iter().flat_map(|r| r.to.iter());
        from.chain(to).any(|peer| peer.ip_block.is_some())
    })
}

// === impl ClusterEvaluation ===

impl<'w, 'p> ClusterEvaluation<'w, 'p> {
    pub fn workloads(
        &self,
    ) -> impl ExactSizeIterator<Item = (&'w Workload, &Selections<'p>)> + '_ {
        self.workloads.iter().map(|(w, s)| (*w, s))
    }

    pub fn get(&self, id: &str) -> Option<&Selections<'p>> {
        self.workloads
            .iter()
            .find(|(w, _)| w.id == id)
            .map(|(_, s)| s)
    }

    /// IDs of policies containing IP block peers, in sorted order.
    pub fn unsupported_policies(&self) -> impl Iterator<Item = &'p str> + '_ {
        self.unsupported.iter().copied()
    }

    pub fn has_unsupported_policies(&self) -> bool {
        !self.unsupported.is_empty()
    }
}
