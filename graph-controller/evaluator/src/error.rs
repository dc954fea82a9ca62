#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("cluster ID must be set")]
    MissingClusterId,

    #[error("failed to fetch {resource} for cluster {cluster_id}")]
    Fetch {
        resource: Resource,
        cluster_id: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Names the store a failed fetch was issued against.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Resource {
    NetworkPolicies,
    Namespaces,
    Workloads,
}

// === impl GraphError ===

impl GraphError {
    /// Indicates the request itself was malformed and should not be retried.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::MissingClusterId)
    }

    pub(crate) fn fetch(
        resource: Resource,
        cluster_id: &str,
    ) -> impl FnOnce(anyhow::Error) -> Self {
        let cluster_id = cluster_id.to_string();
        move |source| Self::Fetch {
            resource,
            cluster_id,
            source,
        }
    }
}

// === impl Resource ===

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkPolicies => "network policies".fmt(f),
            Self::Namespaces => "namespaces".fmt(f),
            Self::Workloads => "workloads".fmt(f),
        }
    }
}
