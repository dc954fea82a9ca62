//! An in-memory index of the cluster state that network graphs are computed
//! from.
//!
//! The index is fed by Kubernetes watches through `kubert`'s indexing traits.
//! Every change to indexed state increments the shared epoch so that graph
//! consumers can tell when a previously computed graph is stale.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod index;
pub mod metrics;
mod stores;


pub use self::{
    index::{Index, SharedIndex, WorkloadKind},
    stores::Stores,
};
