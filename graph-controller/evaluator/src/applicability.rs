//! Determines whether a policy governs a workload.

use netgraph_controller_core::{NetworkPolicy, NetworkPolicySpec, Workload};

/// The outcome of classifying a policy against a workload for egress.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EgressSelection {
    NotSelected,
    Selected {
        /// Set when one of the policy's egress rules names an IP block, which
        /// is taken as a hint that the workload may reach external networks.
        internet_peer: bool,
    },
}

/// Returns the policy's spec if the policy's subject selector covers the
/// workload.
///
/// Policies only govern workloads in their own namespace. Policies without a
/// spec govern nothing.
pub fn selected_spec<'p>(
    workload: &Workload,
    policy: &'p NetworkPolicy,
) -> Option<&'p NetworkPolicySpec> {
    let spec = policy.spec.as_ref()?;
    if workload.namespace != policy.namespace || !spec.pod_selector.matches(&workload.labels) {
        return None;
    }
    Some(spec)
}

/// Indicates whether the policy restricts the workload's ingress.
pub fn ingress_applies(workload: &Workload, policy: &NetworkPolicy) -> bool {
    selected_spec(workload, policy)
        .map(NetworkPolicySpec::restricts_ingress)
        .unwrap_or(false)
}

/// Classifies whether the policy restricts the workload's egress.
pub fn egress_applies(workload: &Workload, policy: &NetworkPolicy) -> EgressSelection {
    match selected_spec(workload, policy) {
        Some(spec) if spec.restricts_egress() => EgressSelection::Selected {
            internet_peer: spec.has_egress_ip_block(),
        },
        _ => EgressSelection::NotSelected,
    }
}

// === impl EgressSelection ===

impl EgressSelection {
    pub fn is_selected(&self) -> bool {
        matches!(self, Self::Selected { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{mk_policy, mk_workload};
    use netgraph_controller_core::{EgressRule, Peer, PolicyType, Selector};

    #[test]
    fn requires_same_namespace() {
        let web = mk_workload("web", "default", Some(("app", "web")));
        let policy = mk_policy("np", "other", Some(("app", "web")), []);
        assert!(!ingress_applies(&web, &policy));
        assert_eq!(egress_applies(&web, &policy), EgressSelection::NotSelected);
    }

    #[test]
    fn requires_selector_match() {
        let web = mk_workload("web", "default", Some(("app", "web")));
        let policy = mk_policy("np", "default", Some(("app", "api")), []);
        assert!(!ingress_applies(&web, &policy));
    }

    #[test]
    fn empty_types_select_ingress_only() {
        let web = mk_workload("web", "default", Some(("app", "web")));
        let mut policy = mk_policy("np", "default", None, []);
        policy.spec.as_mut().unwrap().egress = vec![EgressRule {
            to: vec![Peer::ip_block("0.0.0.0/0".parse().unwrap())],
        }];
        assert!(ingress_applies(&web, &policy));
        assert_eq!(egress_applies(&web, &policy), EgressSelection::NotSelected);
    }

    #[test]
    fn egress_must_be_declared() {
        let web = mk_workload("web", "default", Some(("app", "web")));
        let policy = mk_policy("np", "default", None, [PolicyType::Ingress]);
        assert_eq!(egress_applies(&web, &policy), EgressSelection::NotSelected);

        let policy = mk_policy("np", "default", None, [PolicyType::Egress]);
        assert!(!ingress_applies(&web, &policy));
        assert_eq!(
            egress_applies(&web, &policy),
            EgressSelection::Selected {
                internet_peer: false
            }
        );
    }

    #[test]
    fn ip_block_peers_hint_internet_access() {
        let web = mk_workload("web", "default", Some(("app", "web")));
        let mut policy = mk_policy("np", "default", None, [PolicyType::Egress]);
        policy.spec.as_mut().unwrap().egress = vec![
            EgressRule {
                to: vec![Peer::pods(Selector::from_iter(Some(("app", "db"))))],
            },
            EgressRule {
                to: vec![Peer::ip_block("203.0.113.0/24".parse().unwrap())],
            },
        ];
        assert_eq!(
            egress_applies(&web, &policy),
            EgressSelection::Selected {
                internet_peer: true
            }
        );
    }

    #[test]
    fn policies_without_spec_never_apply() {
        let web = mk_workload("web", "default", Some(("app", "web")));
        let mut policy = mk_policy(
            "np",
            "default",
            None,
            [PolicyType::Ingress, PolicyType::Egress],
        );
        policy.spec = None;
        assert!(!ingress_applies(&web, &policy));
        assert!(!egress_applies(&web, &policy).is_selected());
    }
}
