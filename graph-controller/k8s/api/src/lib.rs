#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod labels;
mod namespace;
mod network_policy;
mod workload;

pub use self::{
    namespace::namespace,
    network_policy::network_policy,
    workload::{workload, PodTemplated},
};
pub use k8s_openapi::{
    api::{
        self,
        apps::v1::{DaemonSet, Deployment, StatefulSet},
        core::v1::Namespace,
        networking::v1::NetworkPolicy,
    },
    apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta},
};
pub use kube::{Resource, ResourceExt};

/// Identifies the cluster that converted objects belong to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("{kind} {name} has no namespace")]
    MissingNamespace { kind: String, name: String },

    #[error("{kind} {name} has no UID")]
    MissingUid { kind: String, name: String },

    #[error("invalid CIDR {cidr:?}")]
    InvalidCidr {
        cidr: String,
        #[source]
        source: ipnet::AddrParseError,
    },

    #[error("invalid policy type {0:?}")]
    InvalidPolicyType(String),
}

/// Returns the namespace and UID of a namespaced resource.
fn namespaced_identity<T>(resource: &T) -> Result<(String, String), ConversionError>
where
    T: Resource<DynamicType = ()>,
{
    let kind = T::kind(&()).to_string();
    let name = resource.name_unchecked();
    let namespace = resource
        .namespace()
        .ok_or_else(|| ConversionError::MissingNamespace {
            kind: kind.clone(),
            name: name.clone(),
        })?;
    let uid = resource
        .uid()
        .ok_or(ConversionError::MissingUid { kind, name })?;
    Ok((namespace, uid))
}
