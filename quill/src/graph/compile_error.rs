//! Graph compilation error.
//!
//! Returned by `StateGraph::compile` when edges reference unknown nodes, the
//! entry or exit is missing, or a node has conflicting outgoing edges.

use thiserror::Error;

/// Error when compiling a state graph.
#[derive(Debug, Error)]
pub enum CompilationError {
    /// A node id in an edge was not registered via `add_node` (and is not START/END).
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// No edge has from_id == START.
    #[error("graph must have exactly one edge from START")]
    MissingStart,

    /// Neither an edge nor a router can reach END.
    #[error("graph must have at least one path to END")]
    MissingEnd,

    /// Edges branch without a router, or a router-free graph loops forever.
    #[error("invalid edges: {0}")]
    InvalidChain(String),

    /// A node has both an outgoing edge and conditional edges; it must have exactly one.
    #[error("node has both edge and conditional edges: {0}")]
    NodeHasBothEdgeAndConditional(String),

    /// A value in a conditional path_map is not a valid node id or END.
    #[error("conditional path_map invalid target: {0}")]
    InvalidConditionalPathMap(String),

    /// A node has neither an outgoing edge nor a router, so a run would stall after it.
    #[error("node has no outgoing edge or router: {0}")]
    NodeWithoutExit(String),

    /// A step budget of zero cannot run any node.
    #[error("max_steps must be at least 1")]
    ZeroStepBudget,
}
