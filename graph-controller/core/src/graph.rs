use serde::{Deserialize, Serialize};

/// The allowed-traffic graph of a cluster as of an epoch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    pub epoch: u64,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// The workload ID.
    pub id: String,
    pub name: String,
    pub cluster: String,
    pub namespace: String,

    /// Set when the workload's egress is not provably restricted to peers
    /// within the cluster.
    pub internet_access: bool,

    /// Sorted IDs of the policies that select this workload.
    pub policy_ids: Vec<String>,
}

/// A directed edge indicating that `source` may open connections to `target`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub source: String,
    pub target: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<EdgeEvidence>,
}

/// The policies that explain why an edge exists.
///
/// Both lists are empty when neither end of the edge is restricted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeEvidence {
    /// Sorted IDs of policies selecting the target for ingress that admit the
    /// source.
    pub ingress_policy_ids: Vec<String>,

    /// Sorted IDs of policies selecting the source for egress that admit the
    /// target.
    pub egress_policy_ids: Vec<String>,
}

// === impl Graph ===

impl Graph {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        self.edges
            .iter()
            .any(|e| e.source == source && e.target == target)
    }

    pub fn edge(&self, source: &str, target: &str) -> Option<&Edge> {
        self.edges
            .iter()
            .find(|e| e.source == source && e.target == target)
    }

    pub fn internet_exposed(&self) -> usize {
        self.nodes.iter().filter(|n| n.internet_access).count()
    }
}
