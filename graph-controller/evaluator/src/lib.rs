//! Network graph evaluation.
//!
//! Given the workloads, namespaces, and NetworkPolicy objects of a cluster, the
//! evaluator computes which workloads may open connections to which others and
//! which workloads may reach destinations outside of the cluster.
//!
//! Evaluation happens in two phases:
//!
//! 1. Every (workload, policy) pair is classified. A policy *selects* a workload
//!    when its pod selector applies to it, restricting that workload's ingress
//!    and/or egress. A policy *matches* a workload when one of its rules names
//!    the workload as an allowed peer.
//! 2. For every ordered pair of distinct workloads, an edge is emitted unless
//!    the source is egress-restricted by policies that don't match the target,
//!    or the target is ingress-restricted by policies that don't match the
//!    source.
//!
//! ```text
//! [ NetworkPolicy ] -selects-> [ Workload ] <-matches- [ NetworkPolicy ]
//! ```
//!
//! Edge derivation visits every ordered pair, so its cost grows with the square
//! of the number of workloads in the cluster.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod applicability;
pub mod cluster;
mod error;
mod evaluator;
pub mod graph;
mod metrics;
pub mod peer;


pub use self::{
    error::{GraphError, Resource},
    evaluator::{Evaluator, EvaluatorConfig},
    metrics::EvaluatorMetrics,
    peer::{NamespaceLookup, PeerMatch, UnsupportedPeer},
};
