#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod epoch;
pub mod graph;
mod labels;
pub mod policy;
mod query;
pub mod store;
mod workload;

pub use self::{
    epoch::{Epoch, SharedEpoch},
    graph::{Edge, EdgeEvidence, Graph, Node},
    labels::{Labels, Map, Selector},
    policy::{EgressRule, IngressRule, IpBlock, NetworkPolicy, NetworkPolicySpec, Peer, PolicyType},
    query::{Field, Query},
    store::{NamespaceStore, NetworkPolicyStore, WorkloadStore},
    workload::{Namespace, Workload},
};
pub use ipnet::{IpNet, Ipv4Net, Ipv6Net};
