use crate::{IpNet, Selector};
use serde::{Deserialize, Serialize};

/// A snapshot of a NetworkPolicy object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkPolicy {
    pub id: String,
    pub name: String,
    pub namespace: String,
    pub cluster_id: String,

    /// Policies without a spec are never evaluated.
    pub spec: Option<NetworkPolicySpec>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkPolicySpec {
    /// Selects the workloads (in the policy's namespace) that the policy governs.
    pub pod_selector: Selector,

    /// The directions this policy restricts. When empty, the policy restricts
    /// ingress only.
    #[serde(default)]
    pub policy_types: Vec<PolicyType>,

    #[serde(default)]
    pub ingress: Vec<IngressRule>,

    #[serde(default)]
    pub egress: Vec<EgressRule>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyType {
    Ingress,
    Egress,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressRule {
    /// An empty list admits traffic from every source.
    #[serde(default)]
    pub from: Vec<Peer>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EgressRule {
    /// An empty list admits traffic to every destination.
    #[serde(default)]
    pub to: Vec<Peer>,
}

/// Identifies the remote end of a rule.
///
/// When neither selector nor an IP block is set, the peer stands for every
/// workload in the policy's own namespace.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Peer {
    pub pod_selector: Option<Selector>,
    pub namespace_selector: Option<Selector>,
    pub ip_block: Option<IpBlock>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpBlock {
    pub cidr: IpNet,
    #[serde(default)]
    pub except: Vec<IpNet>,
}

// === impl NetworkPolicySpec ===

impl NetworkPolicySpec {
    /// Policies that declare no types restrict ingress.
    pub fn restricts_ingress(&self) -> bool {
        self.policy_types.is_empty() || self.policy_types.contains(&PolicyType::Ingress)
    }

    /// Egress must be declared explicitly.
    pub fn restricts_egress(&self) -> bool {
        self.policy_types.contains(&PolicyType::Egress)
    }

    /// Indicates whether any egress rule names an IP block.
    pub fn has_egress_ip_block(&self) -> bool {
        self.egress
            .iter()
            .flat_map(|rule| rule.to.iter())
            .any(|peer| peer.ip_block.is_some())
    }
}

// === impl PolicyType ===

impl std::str::FromStr for PolicyType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "Ingress" => Ok(Self::Ingress),
            "Egress" => Ok(Self::Egress),
            s => Err(anyhow::anyhow!("invalid policy type: {:?}", s)),
        }
    }
}

impl std::fmt::Display for PolicyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ingress => "Ingress".fmt(f),
            Self::Egress => "Egress".fmt(f),
        }
    }
}

// === impl Peer ===

impl Peer {
    pub fn pods(selector: Selector) -> Self {
        Self {
            pod_selector: Some(selector),
            ..Default::default()
        }
    }

    pub fn namespaces(selector: Selector) -> Self {
        Self {
            namespace_selector: Some(selector),
            ..Default::default()
        }
    }

    pub fn ip_block(cidr: IpNet) -> Self {
        Self {
            ip_block: Some(IpBlock {
                cidr,
                except: vec![],
            }),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_policy_types_restrict_ingress_only() {
        let spec = NetworkPolicySpec {
            egress: vec![EgressRule {
                to: vec![Peer::default()],
            }],
            ..Default::default()
        };
        assert!(spec.restricts_ingress());
        assert!(!spec.restricts_egress());
    }

    #[test]
    fn declared_policy_types() {
        let spec = NetworkPolicySpec {
            policy_types: vec![PolicyType::Egress],
            ..Default::default()
        };
        assert!(!spec.restricts_ingress());
        assert!(spec.restricts_egress());

        let spec = NetworkPolicySpec {
            policy_types: vec![PolicyType::Ingress, PolicyType::Egress],
            ..Default::default()
        };
        assert!(spec.restricts_ingress());
        assert!(spec.restricts_egress());
    }

    #[test]
    fn parses_policy_types() {
        assert_eq!("Ingress".parse::<PolicyType>().unwrap(), PolicyType::Ingress);
        assert_eq!("Egress".parse::<PolicyType>().unwrap(), PolicyType::Egress);
        assert!("egress".parse::<PolicyType>().is_err());
    }

    #[test]
    fn detects_egress_ip_blocks() {
        let mut spec = NetworkPolicySpec {
            policy_types: vec![PolicyType::Egress],
            egress: vec![EgressRule {
                to: vec![Peer::pods(Selector::default())],
            }],
            ..Default::default()
        };
        assert!(!spec.has_egress_ip_block());

        spec.egress.push(EgressRule {
            to: vec![Peer::ip_block("0.0.0.0/0".parse().unwrap())],
        });
        assert!(spec.has_egress_ip_block());
    }
}
