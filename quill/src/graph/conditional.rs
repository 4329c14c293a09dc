//! Conditional edges: choose the next node from the state after a node runs.
//!
//! A source node carries a routing function `(state) -> key`; the key is the
//! next node id, or is looked up in an optional path map first.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Router function: pure function of the state returning a routing key.
pub type ConditionalRouterFn<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

/// Routing function plus optional path map.
///
/// With a path map, `next = path_map[key]` when the key is present, otherwise the
/// key itself. Without one, the key is the node id (or END).
#[derive(Clone)]
pub struct ConditionalRouter<S> {
    pub(super) path: ConditionalRouterFn<S>,
    pub(super) path_map: Option<HashMap<String, String>>,
}

impl<S> ConditionalRouter<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    pub fn new(path: ConditionalRouterFn<S>, path_map: Option<HashMap<String, String>>) -> Self {
        Self { path, path_map }
    }

    /// Resolves the next node id (or END) from the current state.
    pub fn resolve_next(&self, state: &S) -> String {
        let key = (self.path)(state);
        self.path_map
            .as_ref()
            .and_then(|m| m.get(&key))
            .cloned()
            .unwrap_or(key)
    }

    /// Known targets, sorted; empty when the router has no path map.
    pub fn targets(&self) -> Vec<String> {
        let mut targets: Vec<String> = self
            .path_map
            .as_ref()
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default();
        targets.sort();
        targets.dedup();
        targets
    }
}

/// Transition table entry for one node.
///
/// `Unconditional(to)` for a static edge, `Conditional(router)` when the next
/// node is decided from state at runtime.
#[derive(Clone)]
pub enum NextEntry<S> {
    /// Fixed next node (or END). The node's `Next` is still respected.
    Unconditional(String),
    /// Next node is decided by the router; the node's `Next` is ignored.
    Conditional(ConditionalRouter<S>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_next_uses_path_map_then_key() {
        let router = ConditionalRouter::<i32>::new(
            Arc::new(|s| if *s > 0 { "pos".into() } else { "other".into() }),
            Some([("pos".to_string(), "positive".to_string())].into_iter().collect()),
        );
        assert_eq!(router.resolve_next(&1), "positive");
        assert_eq!(router.resolve_next(&0), "other");
        assert_eq!(router.targets(), vec!["positive".to_string()]);
    }
}
