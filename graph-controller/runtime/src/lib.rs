#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub use netgraph_controller_core as core;
pub use netgraph_controller_evaluator as evaluator;
pub use netgraph_controller_k8s_api as k8s;
pub use netgraph_controller_k8s_index as index;

mod args;
mod summary;

pub use self::{
    args::Args,
    summary::{Summary, SummaryMetrics},
};
