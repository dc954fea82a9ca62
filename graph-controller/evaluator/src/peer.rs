//! Determines whether a policy's rules name a workload as an allowed peer.

use ahash::AHashMap as HashMap;
use netgraph_controller_core::{Labels, Namespace, NetworkPolicy, Peer, Workload};
use tracing::trace;

/// The outcome of matching a workload against a rule peer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PeerMatch {
    Matched,
    NotMatched,

    /// The peer uses a construct that is not evaluated against workloads. This
    /// never permits traffic.
    Unsupported(UnsupportedPeer),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnsupportedPeer {
    /// IP blocks only inform a workload's internet access; they are never
    /// resolved to workloads.
    IpBlock,
}

/// Resolves a workload's namespace object so that namespace selectors can be
/// evaluated against its labels.
#[derive(Debug, Default)]
pub struct NamespaceLookup<'n> {
    by_cluster: HashMap<&'n str, HashMap<&'n str, &'n Namespace>>,
}

// === impl PeerMatch ===

impl PeerMatch {
    #[inline]
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched)
    }
}

// === impl NamespaceLookup ===

impl<'n> NamespaceLookup<'n> {
    pub fn new(namespaces: &'n [Namespace]) -> Self {
        let mut by_cluster = HashMap::<_, HashMap<_, _>>::default();
        for ns in namespaces {
            by_cluster
                .entry(ns.cluster_id.as_str())
                .or_default()
                .insert(ns.name.as_str(), ns);
        }
        Self { by_cluster }
    }

    /// Returns the labels of the workload's namespace, if the namespace has been
    /// observed.
    pub fn labels(&self, workload: &Workload) -> Option<&'n Labels> {
        let ns = *self
            .by_cluster
            .get(workload.cluster_id.as_str())?
            .get(workload.namespace.as_str())?;
        Some(&ns.labels)
    }
}

/// Matches a workload against a single peer of a policy in `policy_ns`.
pub fn match_peer(
    workload: &Workload,
    policy_ns: &str,
    peer: &Peer,
    namespaces: &NamespaceLookup<'_>,
) -> PeerMatch {
    if peer.ip_block.is_some() {
        trace!(workload = %workload.id, "IP block peers are not matched against workloads");
        return PeerMatch::Unsupported(UnsupportedPeer::IpBlock);
    }

    // A namespace selector replaces the implicit same-namespace constraint.
    if let Some(selector) = peer.namespace_selector.as_ref() {
        let matches = match namespaces.labels(workload) {
            Some(labels) => selector.matches(labels),
            None => selector.matches(&Labels::default()),
        };
        if !matches {
            return PeerMatch::NotMatched;
        }
    } else if workload.namespace != policy_ns {
        return PeerMatch::NotMatched;
    }

    match peer.pod_selector.as_ref() {
        Some(selector) if !selector.matches(&workload.labels) => PeerMatch::NotMatched,
        _ => PeerMatch::Matched,
    }
}

/// Matches a workload against a rule's peer list. An empty list admits every
/// workload.
///
/// If no peer matches but some peer was unsupported, the unsupported outcome
/// is returned so callers can tell the two apart.
pub fn match_any_peer(
    workload: &Workload,
    policy_ns: &str,
    peers: &[Peer],
    namespaces: &NamespaceLookup<'_>,
) -> PeerMatch {
    if peers.is_empty() {
        return PeerMatch::Matched;
    }

    let mut outcome = PeerMatch::NotMatched;
    for peer in peers {
        match match_peer(workload, policy_ns, peer, namespaces) {
            PeerMatch::Matched => return PeerMatch::Matched,
            unsupported @ PeerMatch::Unsupported(_) => outcome = unsupported,
            PeerMatch::NotMatched => {}
        }
    }
    outcome
}

/// Indicates whether any of the policy's ingress rules admits traffic from the
/// workload.
pub fn ingress_rules_match(
    workload: &Workload,
    policy: &NetworkPolicy,
    namespaces: &NamespaceLookup<'_>,
) -> bool {
    policy.spec.iter().flat_map(|spec| spec.ingress.iter()).any(|rule| {
        match_any_peer(workload, &policy.namespace, &rule.from, namespaces).is_match()
    })
}

/// Indicates whether any of the policy's egress rules admits traffic to the
/// workload.
pub fn egress_rules_match(
    workload: &Workload,
    policy: &NetworkPolicy,
    namespaces: &NamespaceLookup<'_>,
) -> bool {
    policy
        .spec
        .iter()
        .flat_map(|spec| spec.egress.iter())
        .any(|rule| match_any_peer(workload, &policy.namespace, &rule.to, namespaces).is_match())
}
