//! Node and engine error types.
//!
//! `AgentError` is returned by `Node::run` and by `CompiledStateGraph::invoke`.
//! Workflow-level failures (validation, retries exhausted, timeout) live in
//! [`crate::workflow::WorkflowError`].

use thiserror::Error;

/// Error raised while running a node or stepping the graph.
///
/// Any of these aborts the current run. Tool failures never show up here:
/// the tool node turns them into tool messages instead.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Execution failed with a message (e.g. the language model call failed).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// A required prompt input was absent from both the state and the message history.
    #[error("missing field `{field}` for node `{node}`: not in state or message history")]
    MissingField { node: String, field: String },

    /// The prompt template references a slot that has no value.
    #[error("template render failed: no value for placeholder `{field}`")]
    TemplateRender { field: String },

    /// The run executed more nodes than the configured step budget.
    #[error("step budget exceeded: more than {limit} steps (next node `{node}`)")]
    StepBudgetExceeded { limit: usize, node: String },

    /// The run deadline passed; checked between nodes only.
    #[error("run deadline exceeded before node `{node}`")]
    DeadlineExceeded { node: String },

    /// Routing produced a node id the compiled graph does not contain.
    #[error("unknown node: {0}")]
    UnknownNode(String),
}
