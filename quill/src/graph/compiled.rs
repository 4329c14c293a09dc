//! Compiled state graph: immutable topology, supports invoke.
//!
//! Built by `StateGraph::compile`. Holds the nodes and a transition table
//! (`NextEntry` per node). Each run walks the table from the first node until a
//! node routes to END, merging node outputs through the state updater. The walk
//! is bounded by a step budget and, when set, a deadline checked between nodes.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::error::AgentError;

use super::logging::{
    log_graph_complete, log_graph_error, log_graph_start, log_node_complete, log_node_start,
    log_node_state, log_route, log_state_update,
};
use super::node_middleware::NodeMiddleware;
use super::state_graph::END;
use super::updater::BoxedStateUpdater;
use super::{Next, NextEntry, Node, RunConfig, RunContext};

/// Compiled graph: immutable structure, safe to share across concurrent runs.
///
/// Created by `StateGraph::compile()`, which guarantees every node an entry in
/// the transition table. After each node the next node comes from that entry,
/// unless the node returned `Next::End` and has no router.
#[derive(Clone)]
pub struct CompiledStateGraph<S> {
    pub(super) nodes: HashMap<String, Arc<dyn Node<S>>>,
    /// First node to run (from START).
    pub(super) first_node_id: String,
    /// Transition table: node id -> Unconditional(to_id) or Conditional(router).
    pub(super) next_map: HashMap<String, NextEntry<S>>,
    pub(super) middleware: Option<Arc<dyn NodeMiddleware<S>>>,
    pub(super) state_updater: BoxedStateUpdater<S>,
    /// Default step budget; `RunConfig::max_steps` overrides it per run.
    pub(super) max_steps: usize,
}

impl<S> CompiledStateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Runs one node, through the middleware when one is set.
    async fn execute_node(
        &self,
        node: Arc<dyn Node<S>>,
        state: S,
        run_ctx: &RunContext,
    ) -> Result<(S, Next), AgentError> {
        match &self.middleware {
            Some(middleware) => {
                let node_id = node.id().to_string();
                let ctx = run_ctx.clone();
                middleware
                    .around_run(
                        &node_id,
                        state,
                        Box::new(move |s| {
                            Box::pin(async move { node.run_with_context(s, &ctx).await })
                        }),
                    )
                    .await
            }
            None => node.run_with_context(state, run_ctx).await,
        }
    }

    /// Next node id after `current_id`; `None` means the run is over.
    fn resolve_next(&self, current_id: &str, state: &S, next: Next) -> Option<String> {
        let entry = self.next_map.get(current_id);
        if let Some(NextEntry::Conditional(router)) = entry {
            return Some(router.resolve_next(state));
        }
        match (next, entry) {
            (Next::End, _) => None,
            (Next::Continue, Some(NextEntry::Unconditional(id))) => Some(id.clone()),
            (Next::Continue, _) => None,
        }
    }

    async fn run_loop(&self, state: &mut S, run_ctx: &mut RunContext) -> Result<(), AgentError> {
        let max_steps = run_ctx.config.max_steps.unwrap_or(self.max_steps);
        let mut current_id = self.first_node_id.clone();
        log_graph_start(run_ctx.run_id());

        loop {
            if run_ctx.config.deadline_passed() {
                return Err(fail(AgentError::DeadlineExceeded { node: current_id }));
            }
            if run_ctx.step >= max_steps {
                return Err(fail(AgentError::StepBudgetExceeded {
                    limit: max_steps,
                    node: current_id,
                }));
            }
            let node = match self.nodes.get(&current_id) {
                Some(node) => node.clone(),
                None => return Err(fail(AgentError::UnknownNode(current_id))),
            };

            log_node_start(&current_id, run_ctx.step);
            log_node_state(&current_id, state);

            let (update, next) = self
                .execute_node(node, state.clone(), run_ctx)
                .await
                .map_err(fail)?;
            run_ctx.step += 1;

            log_node_complete(&current_id, &next);
            self.state_updater.apply_update(state, &update);
            log_state_update(&current_id);

            match self.resolve_next(&current_id, state, next) {
                Some(id) if id != END => {
                    log_route(&current_id, &id);
                    current_id = id;
                }
                _ => {
                    log_graph_complete(run_ctx.run_id(), run_ctx.step);
                    return Ok(());
                }
            }
        }
    }

    /// Runs the graph from its first node and returns the final state.
    ///
    /// Errors: any node error; `StepBudgetExceeded` when the run needs more node
    /// executions than the budget; `DeadlineExceeded` when `config.deadline` passes
    /// (checked before each node); `UnknownNode` when routing names a missing node.
    pub async fn invoke(&self, state: S, config: Option<RunConfig>) -> Result<S, AgentError> {
        if self.nodes.is_empty() || !self.nodes.contains_key(&self.first_node_id) {
            return Err(AgentError::ExecutionFailed("empty graph".into()));
        }
        let mut run_ctx = RunContext::new(config.unwrap_or_default());
        let mut state = state;
        self.run_loop(&mut state, &mut run_ctx).await?;
        Ok(state)
    }

    pub fn first_node_id(&self) -> &str {
        &self.first_node_id
    }

    /// Node ids, sorted.
    pub fn node_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.nodes.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }
}

fn fail(error: AgentError) -> AgentError {
    log_graph_error(&error);
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    use async_trait::async_trait;

    use crate::graph::node_middleware::NodeCall;
    use crate::graph::{ReplaceUpdater, StateGraph, START};

    /// **Scenario**: When the graph has no nodes, invoke returns ExecutionFailed("empty graph").
    #[tokio::test]
    async fn invoke_empty_graph_returns_execution_failed() {
        let graph = CompiledStateGraph::<i32> {
            nodes: HashMap::new(),
            first_node_id: String::new(),
            next_map: HashMap::new(),
            middleware: None,
            state_updater: Arc::new(ReplaceUpdater),
            max_steps: 25,
        };
        let result = graph.invoke(0, None).await;
        match &result {
            Err(AgentError::ExecutionFailed(msg)) => assert!(msg.contains("empty graph"), "{}", msg),
            _ => panic!("expected ExecutionFailed(\"empty graph\"), got {:?}", result),
        }
    }

    #[derive(Clone)]
    struct AddNode {
        id: &'static str,
        delta: i32,
    }

    #[async_trait]
    impl Node<i32> for AddNode {
        fn id(&self) -> &str {
            self.id
        }

        async fn run(&self, state: i32) -> Result<(i32, Next), AgentError> {
            Ok((state + self.delta, Next::Continue))
        }
    }

    /// Node that returns Next::End after one step.
    #[derive(Clone)]
    struct EndAfterNode {
        id: &'static str,
        delta: i32,
    }

    #[async_trait]
    impl Node<i32> for EndAfterNode {
        fn id(&self) -> &str {
            self.id
        }
        async fn run(&self, state: i32) -> Result<(i32, Next), AgentError> {
            Ok((state + self.delta, Next::End))
        }
    }

    struct FailingNode;

    #[async_trait]
    impl Node<i32> for FailingNode {
        fn id(&self) -> &str {
            "fail"
        }
        async fn run(&self, _state: i32) -> Result<(i32, Next), AgentError> {
            Err(AgentError::ExecutionFailed("boom".into()))
        }
    }

    fn build_two_step_graph() -> CompiledStateGraph<i32> {
        let mut graph = StateGraph::<i32>::new();
        graph
            .add_node("first", Arc::new(AddNode { id: "first", delta: 1 }))
            .add_node("second", Arc::new(AddNode { id: "second", delta: 2 }))
            .add_edge(START, "first")
            .add_edge("first", "second")
            .add_edge("second", END);
        graph.compile().expect("graph compiles")
    }

    /// Loop: "inc" adds 1 and routes back to itself until the state reaches `until`.
    fn build_loop_graph(until: i32, max_steps: usize) -> CompiledStateGraph<i32> {
        let mut graph = StateGraph::<i32>::new().with_max_steps(max_steps);
        graph
            .add_node("inc", Arc::new(AddNode { id: "inc", delta: 1 }))
            .add_edge(START, "inc")
            .add_conditional_edges(
                "inc",
                Arc::new(move |s: &i32| {
                    if *s < until {
                        "again".to_string()
                    } else {
                        "done".to_string()
                    }
                }),
                Some(
                    [
                        ("again".to_string(), "inc".to_string()),
                        ("done".to_string(), END.to_string()),
                    ]
                    .into_iter()
                    .collect(),
                ),
            );
        graph.compile().expect("graph compiles")
    }

    #[tokio::test]
    async fn invoke_linear_chain_runs_in_order() {
        let graph = build_two_step_graph();
        assert_eq!(graph.invoke(0, None).await.unwrap(), 3);
    }

    /// **Scenario**: Conditional edges route by state; a self-loop runs until the router exits.
    #[tokio::test]
    async fn invoke_cycle_until_router_ends() {
        let graph = build_loop_graph(5, 25);
        assert_eq!(graph.invoke(0, None).await.unwrap(), 5);
    }

    /// **Scenario**: A loop that never exits is stopped by the step budget with a fatal error.
    #[tokio::test]
    async fn invoke_cycle_exceeding_budget_fails() {
        let graph = build_loop_graph(i32::MAX, 4);
        match graph.invoke(0, None).await {
            Err(AgentError::StepBudgetExceeded { limit, node }) => {
                assert_eq!(limit, 4);
                assert_eq!(node, "inc");
            }
            other => panic!("expected StepBudgetExceeded, got {:?}", other),
        }
    }

    /// **Scenario**: A run needing exactly the budget succeeds; the run config can override it.
    #[tokio::test]
    async fn invoke_budget_is_inclusive_and_overridable() {
        let graph = build_loop_graph(4, 4);
        assert_eq!(graph.invoke(0, None).await.unwrap(), 4);
        let result = graph
            .invoke(0, Some(RunConfig::default().with_max_steps(2)))
            .await;
        assert!(matches!(
            result,
            Err(AgentError::StepBudgetExceeded { limit: 2, .. })
        ));
    }

    #[tokio::test]
    async fn invoke_next_end_stops_early() {
        let mut graph = StateGraph::<i32>::new();
        graph
            .add_node("stop", Arc::new(EndAfterNode { id: "stop", delta: 5 }))
            .add_node("never", Arc::new(AddNode { id: "never", delta: 100 }))
            .add_edge(START, "stop")
            .add_edge("stop", "never")
            .add_edge("never", END);
        let graph = graph.compile().unwrap();
        assert_eq!(graph.invoke(0, None).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn invoke_propagates_node_error() {
        let mut graph = StateGraph::<i32>::new();
        graph
            .add_node("fail", Arc::new(FailingNode))
            .add_edge(START, "fail")
            .add_edge("fail", END);
        let graph = graph.compile().unwrap();
        match graph.invoke(0, None).await {
            Err(AgentError::ExecutionFailed(msg)) => assert_eq!(msg, "boom"),
            other => panic!("expected ExecutionFailed, got {:?}", other),
        }
    }

    /// **Scenario**: An expired deadline aborts before the first node runs.
    #[tokio::test]
    async fn invoke_past_deadline_fails_before_node() {
        let graph = build_two_step_graph();
        let config = RunConfig::default().with_deadline(Instant::now() - Duration::from_millis(1));
        match graph.invoke(0, Some(config)).await {
            Err(AgentError::DeadlineExceeded { node }) => assert_eq!(node, "first"),
            other => panic!("expected DeadlineExceeded, got {:?}", other),
        }
    }

    /// **Scenario**: A router naming a node that does not exist fails with UnknownNode.
    #[tokio::test]
    async fn invoke_router_to_unknown_node_fails() {
        let mut graph = StateGraph::<i32>::new();
        graph
            .add_node("a", Arc::new(AddNode { id: "a", delta: 1 }))
            .add_edge(START, "a")
            .add_conditional_edges("a", Arc::new(|_| "ghost".to_string()), None);
        let graph = graph.compile().unwrap();
        match graph.invoke(0, None).await {
            Err(AgentError::UnknownNode(id)) => assert_eq!(id, "ghost"),
            other => panic!("expected UnknownNode, got {:?}", other),
        }
    }

    struct CountingMiddleware {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl NodeMiddleware<i32> for CountingMiddleware {
        async fn around_run(
            &self,
            _node_id: &str,
            state: i32,
            inner: NodeCall<i32>,
        ) -> Result<(i32, Next), AgentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            inner(state).await
        }
    }

    #[tokio::test]
    async fn invoke_runs_every_node_through_middleware() {
        let middleware = Arc::new(CountingMiddleware {
            calls: AtomicUsize::new(0),
        });
        let mut graph = StateGraph::<i32>::new().with_middleware(middleware.clone());
        graph
            .add_node("first", Arc::new(AddNode { id: "first", delta: 1 }))
            .add_node("second", Arc::new(AddNode { id: "second", delta: 2 }))
            .add_edge(START, "first")
            .add_edge("first", "second")
            .add_edge("second", END);
        let graph = graph.compile().unwrap();
        assert_eq!(graph.invoke(0, None).await.unwrap(), 3);
        assert_eq!(middleware.calls.load(Ordering::SeqCst), 2);
    }
}
