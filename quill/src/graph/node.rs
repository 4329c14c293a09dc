//! Graph node trait: one step in a StateGraph.
//!
//! Receives the running state `S`, returns a partial `S` (merged by the graph's
//! `StateUpdater`) and `Next`.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::AgentError;

use super::{Next, RunContext};

/// One step in a graph: state in, (partial state out, next step).
///
/// **Interaction**: Registered via `StateGraph::add_node`; run by
/// `CompiledStateGraph::invoke`. What the returned state means depends on the
/// graph's updater: a full replacement by default, a partial update for
/// `ArticleState` graphs.
#[async_trait]
pub trait Node<S>: Send + Sync
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Node id (e.g. `"research"`). Must be unique within a graph.
    fn id(&self) -> &str;

    /// One step: state in, (state out, next step).
    async fn run(&self, state: S) -> Result<(S, Next), AgentError>;

    /// Variant with run context (run id, step number).
    ///
    /// Default implementation calls `run` and ignores the context.
    async fn run_with_context(&self, state: S, _ctx: &RunContext) -> Result<(S, Next), AgentError> {
        self.run(state).await
    }
}
