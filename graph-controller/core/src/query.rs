use crate::Workload;
use ahash::AHashMap as HashMap;
use std::collections::BTreeSet;

/// Workload attributes that a [`Query`] may constrain.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    ClusterId,
    /// The cluster's display name.
    Cluster,
    Namespace,
    /// The workload's name.
    Workload,
    /// A `key=value` label.
    Label,
}

/// A conjunction of field constraints. Each field matches if any of its values
/// match; fields that are not set are unconstrained.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Query {
    fields: HashMap<Field, BTreeSet<String>>,
}

// === impl Query ===

impl Query {
    /// Adds values to a field's constraint.
    pub fn with(mut self, field: Field, values: impl IntoIterator<Item = impl ToString>) -> Self {
        self.fields
            .entry(field)
            .or_default()
            .extend(values.into_iter().map(|v| v.to_string()));
        self
    }

    /// Constrains the query to exactly one cluster, replacing any cluster ID
    /// values already present.
    pub fn scoped_to_cluster(mut self, cluster_id: impl ToString) -> Self {
        self.fields
            .insert(Field::ClusterId, Some(cluster_id.to_string()).into_iter().collect());
        self
    }

    pub fn values(&self, field: Field) -> Option<&BTreeSet<String>> {
        self.fields.get(&field)
    }

    pub fn matches(&self, workload: &Workload) -> bool {
        self.fields.iter().all(|(field, values)| match field {
            Field::ClusterId => values.contains(&workload.cluster_id),
            Field::Cluster => values.contains(&workload.cluster_name),
            Field::Namespace => values.contains(&workload.namespace),
            Field::Workload => values.contains(&workload.name),
            Field::Label => values.iter().any(|kv| match kv.split_once('=') {
                Some((k, v)) => workload.labels.get(k) == Some(v),
                None => workload.labels.get(kv).is_some(),
            }),
        })
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ClusterId => "Cluster ID".fmt(f),
            Self::Cluster => "Cluster".fmt(f),
            Self::Namespace => "Namespace".fmt(f),
            Self::Workload => "Deployment".fmt(f),
            Self::Label => "Label".fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Labels;
    use maplit::btreemap;

    fn mk_workload(ns: &str, name: &str) -> Workload {
        Workload {
            id: format!("{ns}/{name}"),
            name: name.to_string(),
            cluster_id: "c1".to_string(),
            cluster_name: "remote".to_string(),
            namespace: ns.to_string(),
            labels: Labels::from(btreemap! {
                "app".to_string() => name.to_string(),
                "tier".to_string() => "backend".to_string(),
            }),
        }
    }

    #[test]
    fn empty_query_matches_everything() {
        assert!(Query::default().matches(&mk_workload("default", "api")));
    }

    #[test]
    fn fields_are_conjoined() {
        let query = Query::default()
            .with(Field::Namespace, ["default", "prod"])
            .with(Field::Label, ["tier=backend"]);
        assert!(query.matches(&mk_workload("default", "api")));
        assert!(query.matches(&mk_workload("prod", "api")));
        assert!(!query.matches(&mk_workload("kube-system", "api")));

        let query = query.with(Field::Workload, ["web"]);
        assert!(!query.matches(&mk_workload("default", "api")));
    }

    #[test]
    fn label_without_value_checks_presence() {
        let query = Query::default().with(Field::Label, ["tier"]);
        assert!(query.matches(&mk_workload("default", "api")));
        let query = Query::default().with(Field::Label, ["zone"]);
        assert!(!query.matches(&mk_workload("default", "api")));
    }

    #[test]
    fn cluster_scope_replaces_caller_cluster_ids() {
        let query = Query::default()
            .with(Field::ClusterId, ["c1", "c2"])
            .scoped_to_cluster("c2");
        assert_eq!(
            query.values(Field::ClusterId).unwrap().iter().collect::<Vec<_>>(),
            vec!["c2"]
        );
        assert!(!query.matches(&mk_workload("default", "api")));
    }
}
