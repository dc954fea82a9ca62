use crate::LabelSelector;
use netgraph_controller_core::Selector;
use tracing::debug;

/// Converts a Kubernetes label selector.
///
/// Only `matchLabels` is modeled. Expressions are dropped, so a selector
/// consisting solely of expressions selects everything.
pub fn selector(selector: &LabelSelector) -> Selector {
    if let Some(exprs) = selector.match_expressions.as_ref().filter(|e| !e.is_empty()) {
        debug!(count = exprs.len(), "Ignoring label selector expressions");
    }
    Selector::from_map(selector.match_labels.clone().unwrap_or_default())
}
