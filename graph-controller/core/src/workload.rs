use crate::Labels;
use serde::{Deserialize, Serialize};

/// A snapshot of a deployed workload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workload {
    pub id: String,
    pub name: String,
    pub cluster_id: String,
    pub cluster_name: String,
    pub namespace: String,

    /// The labels that pod selectors are evaluated against.
    #[serde(default)]
    pub labels: Labels,
}

/// A snapshot of a namespace within a cluster.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Namespace {
    pub name: String,
    pub cluster_id: String,
    #[serde(default)]
    pub labels: Labels,
}
