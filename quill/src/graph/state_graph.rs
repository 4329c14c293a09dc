//! State graph builder: nodes, static edges and conditional edges.
//!
//! Add nodes with `add_node`, wire them with `add_edge(from, to)` using `START`
//! and `END` for entry/exit, and branch with `add_conditional_edges`. Cycles are
//! allowed (e.g. a tool node feeding back into the agent that requested it);
//! the compiled graph bounds every run with a step budget.
//!
//! # State updates
//!
//! By default a node's output replaces the state. Use `with_state_updater` to
//! merge partial outputs field by field (see `ArticleStateUpdater`).

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

use super::compile_error::CompilationError;
use super::compiled::CompiledStateGraph;
use super::conditional::{ConditionalRouter, ConditionalRouterFn, NextEntry};
use super::node::Node;
use super::node_middleware::NodeMiddleware;
use super::updater::{BoxedStateUpdater, ReplaceUpdater};

/// Sentinel for graph entry: use as `from_id` in `add_edge(START, first_node_id)`.
pub const START: &str = "__start__";

/// Sentinel for graph exit: use as `to_id` in `add_edge(last_node_id, END)`.
pub const END: &str = "__end__";

/// Step budget used when neither the graph nor the run sets one.
pub const DEFAULT_MAX_STEPS: usize = 25;

/// State graph: nodes plus explicit edges and optional conditional edges.
///
/// **Interaction**: Accepts `Arc<dyn Node<S>>`; produces `CompiledStateGraph<S>`.
pub struct StateGraph<S> {
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    /// Edges (from_id, to_id). A node may have one outgoing edge or conditional edges, not both.
    edges: Vec<(String, String)>,
    conditional_edges: HashMap<String, ConditionalRouter<S>>,
    middleware: Option<Arc<dyn NodeMiddleware<S>>>,
    state_updater: Option<BoxedStateUpdater<S>>,
    max_steps: usize,
}

impl<S> Default for StateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: Vec::new(),
            conditional_edges: HashMap::new(),
            middleware: None,
            state_updater: None,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    /// Attaches node middleware; every node run goes through it.
    pub fn with_middleware(self, middleware: Arc<dyn NodeMiddleware<S>>) -> Self {
        Self {
            middleware: Some(middleware),
            ..self
        }
    }

    /// Attaches a custom state updater (default: `ReplaceUpdater`).
    ///
    /// ```rust,no_run
    /// use quill::graph::StateGraph;
    /// use quill::state::{ArticleState, ArticleStateUpdater};
    /// use std::sync::Arc;
    ///
    /// let graph = StateGraph::<ArticleState>::new()
    ///     .with_state_updater(Arc::new(ArticleStateUpdater));
    /// ```
    pub fn with_state_updater(self, updater: BoxedStateUpdater<S>) -> Self {
        Self {
            state_updater: Some(updater),
            ..self
        }
    }

    /// Maximum node executions per run. Exceeding it fails the run.
    pub fn with_max_steps(self, max_steps: usize) -> Self {
        Self { max_steps, ..self }
    }

    /// Adds a node; replaces any node with the same id.
    pub fn add_node(&mut self, id: impl Into<String>, node: Arc<dyn Node<S>>) -> &mut Self {
        self.nodes.insert(id.into(), node);
        self
    }

    /// Adds an edge from `from_id` to `to_id`. Use `START` / `END` for entry and exit.
    pub fn add_edge(&mut self, from_id: impl Into<String>, to_id: impl Into<String>) -> &mut Self {
        self.edges.push((from_id.into(), to_id.into()));
        self
    }

    /// Adds conditional edges from `source`: after it runs, `path(state)` picks the next node.
    ///
    /// - `path_map == None`: the returned key is the next node id (or END).
    /// - `path_map == Some(map)`: next is `map[key]` if present, otherwise the key itself.
    ///
    /// The source must not also have an outgoing `add_edge`.
    ///
    /// ```rust,ignore
    /// graph.add_conditional_edges(
    ///     "research",
    ///     Arc::new(|s: &ArticleState| tools_condition(&s.messages).as_str().to_string()),
    ///     Some([("tools".into(), "web_search".into()), ("continue".into(), "write".into())]
    ///         .into_iter().collect()),
    /// );
    /// ```
    pub fn add_conditional_edges(
        &mut self,
        source: impl Into<String>,
        path: ConditionalRouterFn<S>,
        path_map: Option<HashMap<String, String>>,
    ) -> &mut Self {
        self.conditional_edges
            .insert(source.into(), ConditionalRouter::new(path, path_map));
        self
    }

    /// Validates the topology and builds the executable graph.
    ///
    /// Checks: every edge endpoint exists; exactly one START edge; END reachable by
    /// an edge or a router; no node with two static edges or with both a static
    /// edge and a router; every node has an edge or a router; path map targets
    /// exist. Graphs without routers must form a chain that reaches END.
    pub fn compile(self) -> Result<CompiledStateGraph<S>, CompilationError> {
        if self.max_steps == 0 {
            return Err(CompilationError::ZeroStepBudget);
        }
        for (from, to) in &self.edges {
            if from != START && !self.nodes.contains_key(from) {
                return Err(CompilationError::NodeNotFound(from.clone()));
            }
            if to != END && !self.nodes.contains_key(to) {
                return Err(CompilationError::NodeNotFound(to.clone()));
            }
        }
        for (source, router) in &self.conditional_edges {
            if !self.nodes.contains_key(source) {
                return Err(CompilationError::NodeNotFound(source.clone()));
            }
            if let Some(path_map) = &router.path_map {
                for target in path_map.values() {
                    if target != END && !self.nodes.contains_key(target) {
                        return Err(CompilationError::InvalidConditionalPathMap(target.clone()));
                    }
                }
            }
        }

        let mut start_edges = self.edges.iter().filter(|(f, _)| f == START).map(|(_, t)| t);
        let first = match (start_edges.next(), start_edges.next()) {
            (None, _) => return Err(CompilationError::MissingStart),
            (Some(first), None) => first.clone(),
            (Some(_), Some(_)) => {
                return Err(CompilationError::InvalidChain(
                    "multiple edges from START (branch)".into(),
                ))
            }
        };

        let has_end = self.edges.iter().any(|(_, t)| t == END)
            || self.conditional_edges.values().any(|r| {
                r.path_map
                    .as_ref()
                    .map_or(true, |m| m.values().any(|v| v == END))
            });
        if !has_end {
            return Err(CompilationError::MissingEnd);
        }

        let mut next_map: HashMap<String, NextEntry<S>> = HashMap::new();
        for (from, to) in self.edges.iter().filter(|(f, _)| f != START) {
            if next_map
                .insert(from.clone(), NextEntry::Unconditional(to.clone()))
                .is_some()
            {
                return Err(CompilationError::InvalidChain(format!(
                    "duplicate edges from {} (branch)",
                    from
                )));
            }
        }
        for (source, router) in &self.conditional_edges {
            if next_map.contains_key(source) {
                return Err(CompilationError::NodeHasBothEdgeAndConditional(
                    source.clone(),
                ));
            }
            next_map.insert(source.clone(), NextEntry::Conditional(router.clone()));
        }
        let mut ids: Vec<&String> = self.nodes.keys().collect();
        ids.sort_unstable();
        if let Some(id) = ids.into_iter().find(|id| !next_map.contains_key(id.as_str())) {
            return Err(CompilationError::NodeWithoutExit(id.clone()));
        }

        // Without routers nothing can break a static loop, so reject it up front.
        if self.conditional_edges.is_empty() {
            let mut visited: HashSet<&str> = HashSet::from([first.as_str()]);
            let mut current = first.as_str();
            while let Some(NextEntry::Unconditional(next)) = next_map.get(current) {
                if next == END {
                    break;
                }
                if !visited.insert(next.as_str()) {
                    return Err(CompilationError::InvalidChain("cycle detected".into()));
                }
                current = next.as_str();
            }
        }

        Ok(CompiledStateGraph {
            nodes: self.nodes,
            first_node_id: first,
            next_map,
            middleware: self.middleware,
            state_updater: self.state_updater.unwrap_or_else(|| Arc::new(ReplaceUpdater)),
            max_steps: self.max_steps,
        })
    }
}
