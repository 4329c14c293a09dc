//! State updater: how a node's partial output is merged into the running state.
//!
//! Nodes return a value of the state type holding only what they produced; the
//! compiled graph passes it to a `StateUpdater` after every step. The default
//! `ReplaceUpdater` swaps the whole state, which suits plain value states such as
//! the `i32` graphs in tests. Record-like states provide per-field rules instead
//! (see [`crate::state::ArticleStateUpdater`]).

use std::fmt::Debug;
use std::sync::Arc;

/// Merge rule applied after each node execution.
pub trait StateUpdater<S>: Send + Sync + Debug
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Merge `update` (the node's output) into `current`.
    fn apply_update(&self, current: &mut S, update: &S);
}

/// Default updater: the node's output replaces the entire state.
#[derive(Debug, Clone, Default)]
pub struct ReplaceUpdater;

impl<S> StateUpdater<S> for ReplaceUpdater
where
    S: Clone + Send + Sync + Debug + 'static,
{
    fn apply_update(&self, current: &mut S, update: &S) {
        *current = update.clone();
    }
}

/// Shared, type-erased updater held by the graph.
pub type BoxedStateUpdater<S> = Arc<dyn StateUpdater<S>>;
