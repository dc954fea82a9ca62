use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::Arc};

#[derive(Clone, Debug, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Labels(Arc<Map>);

pub type Map = BTreeMap<String, String>;

/// Selects workloads or namespaces by label.
///
/// Matching is inclusive: a non-empty selector matches a target when *any* of
/// the target's labels has the same value in the selector. This is looser than
/// the Kubernetes `matchLabels` semantics (which require every selector entry
/// to be present) and graph consumers depend on it, so it must not be
/// tightened here.
#[derive(Clone, Debug, Eq, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selector {
    #[serde(default)]
    match_labels: Map,
}

// === Selector ===

impl Selector {
    pub fn from_map(match_labels: Map) -> Self {
        Self { match_labels }
    }

    /// An empty selector selects everything.
    pub fn is_empty(&self) -> bool {
        self.match_labels.is_empty()
    }

    pub fn matches(&self, labels: &Labels) -> bool {
        if self.match_labels.is_empty() {
            return true;
        }

        labels
            .0
            .iter()
            .any(|(k, v)| self.match_labels.get(k) == Some(v))
    }
}

impl std::iter::FromIterator<(String, String)> for Selector {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self::from_map(iter.into_iter().collect())
    }
}

impl std::iter::FromIterator<(&'static str, &'static str)> for Selector {
    fn from_iter<T: IntoIterator<Item = (&'static str, &'static str)>>(iter: T) -> Self {
        Self::from_map(
            iter.into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

// === Labels ===

impl Labels {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

}

impl From<Map> for Labels {
    #[inline]
    fn from(labels: Map) -> Self {
        Self(Arc::new(labels))
    }
}

impl From<Option<Map>> for Labels {
    #[inline]
    fn from(labels: Option<Map>) -> Self {
        labels.unwrap_or_default().into()
    }
}

impl AsRef<Map> for Labels {
    #[inline]
    fn as_ref(&self) -> &Map {
        self.0.as_ref()
    }
}

impl<T: AsRef<Map>> std::cmp::PartialEq<T> for Labels {
    #[inline]
    fn eq(&self, t: &T) -> bool {
        self.0.as_ref().eq(t.as_ref())
    }
}

impl std::iter::FromIterator<(String, String)> for Labels {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(Arc::new(iter.into_iter().collect()))
    }
}

impl std::iter::FromIterator<(&'static str, &'static str)> for Labels {
    fn from_iter<T: IntoIterator<Item = (&'static str, &'static str)>>(iter: T) -> Self {
        iter.into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::iter::FromIterator;

    #[test]
    fn test_matches() {
        for (selector, labels, matches, msg) in &[
            (Selector::default(), Labels::default(), true, "empty match"),
            (
                Selector::default(),
                Labels::from_iter(Some(("app", "web"))),
                true,
                "empty selector selects everything",
            ),
            (
                Selector::from_iter(Some(("foo", "bar"))),
                Labels::from_iter(Some(("foo", "bar"))),
                true,
                "exact label match",
            ),
            (
                Selector::from_iter(Some(("foo", "bar"))),
                Labels::from_iter(vec![("foo", "bar"), ("bah", "baz")]),
                true,
                "sufficient label match",
            ),
            (
                Selector::from_iter(Some(("foo", "bar"))),
                Labels::from_iter(Some(("foo", "qux"))),
                false,
                "value mismatch",
            ),
            (
                Selector::from_iter(Some(("foo", "bar"))),
                Labels::default(),
                false,
                "no labels",
            ),
        ] {
            assert_eq!(selector.matches(labels), *matches, "{}", msg);
        }
    }

    /// Pins the inclusive matching behavior: one agreeing key is enough, even
    /// when other selector keys are missing or disagree.
    #[test]
    fn any_single_label_satisfies_selector() {
        let selector = Selector::from_iter(vec![("app", "web"), ("tier", "frontend")]);

        assert!(selector.matches(&Labels::from_iter(Some(("app", "web")))));
        assert!(selector.matches(&Labels::from_iter(vec![
            ("app", "web"),
            ("tier", "backend")
        ])));
        assert!(selector.matches(&Labels::from_iter(Some(("tier", "frontend")))));
        assert!(!selector.matches(&Labels::from_iter(Some(("app", "api")))));
    }

    #[test]
    fn absent_selector_key_never_matches_empty_value() {
        let selector = Selector::from_iter(Some(("app", "web")));
        assert!(!selector.matches(&Labels::from_iter(Some(("release", "")))));
    }
}
