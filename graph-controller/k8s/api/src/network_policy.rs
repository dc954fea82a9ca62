use crate::{labels, ClusterRef, ConversionError, LabelSelector, ResourceExt};
use k8s_openapi::api::networking::v1 as k8s;
use netgraph_controller_core::{
    EgressRule, IngressRule, IpBlock, IpNet, NetworkPolicy, NetworkPolicySpec, Peer, PolicyType,
};

pub fn network_policy(
    cluster: &ClusterRef,
    np: &k8s::NetworkPolicy,
) -> Result<NetworkPolicy, ConversionError> {
    let (namespace, id) = crate::namespaced_identity(np)?;
    let spec = np.spec.as_ref().map(spec).transpose()?;
    Ok(NetworkPolicy {
        id,
        name: np.name_unchecked(),
        namespace,
        cluster_id: cluster.id.clone(),
        spec,
    })
}

fn spec(spec: &k8s::NetworkPolicySpec) -> Result<NetworkPolicySpec, ConversionError> {
    // Newer API versions make the pod selector optional.
    let pod_selector: Option<LabelSelector> = spec.pod_selector.clone().into();
    let pod_selector = pod_selector
        .as_ref()
        .map(labels::selector)
        .unwrap_or_default();

    let policy_types = spec
        .policy_types
        .iter()
        .flatten()
        .map(|t| {
            t.parse::<PolicyType>()
                .map_err(|_| ConversionError::InvalidPolicyType(t.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let ingress = spec
        .ingress
        .iter()
        .flatten()
        .map(|rule| {
            Ok(IngressRule {
                from: peers(rule.from.as_deref())?,
            })
        })
        .collect::<Result<Vec<_>, ConversionError>>()?;

    let egress = spec
        .egress
        .iter()
        .flatten()
        .map(|rule| {
            Ok(EgressRule {
                to: peers(rule.to.as_deref())?,
            })
        })
        .collect::<Result<Vec<_>, ConversionError>>()?;

    Ok(NetworkPolicySpec {
        pod_selector,
        policy_types,
        ingress,
        egress,
    })
}

fn peers(peers: Option<&[k8s::NetworkPolicyPeer]>) -> Result<Vec<Peer>, ConversionError> {
    peers.unwrap_or_default().iter().map(peer).collect()
}

fn peer(peer: &k8s::NetworkPolicyPeer) -> Result<Peer, ConversionError> {
    let ip_block = match peer.ip_block.as_ref() {
        None => None,
        Some(block) => Some(IpBlock {
            cidr: parse_cidr(&block.cidr)?,
            except: block
                .except
                .iter()
                .flatten()
                .map(|c| parse_cidr(c))
                .collect::<Result<Vec<_>, _>>()?,
        }),
    };
    Ok(Peer {
        pod_selector: peer.pod_selector.as_ref().map(labels::selector),
        namespace_selector: peer.namespace_selector.as_ref().map(labels::selector),
        ip_block,
    })
}

fn parse_cidr(cidr: &str) -> Result<IpNet, ConversionError> {
    cidr.parse().map_err(|source| ConversionError::InvalidCidr {
        cidr: cidr.to_string(),
        source,
    })
}
