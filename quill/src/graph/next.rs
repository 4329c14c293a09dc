//! Next-step result from a graph node: follow the transition table, or end.

/// Next step after running a node.
///
/// - **Continue**: follow the node's outgoing edge (or its router).
/// - **End**: stop and return the current state; ignored when the node has a router.
///
/// **Interaction**: Returned by `Node::run`; consumed by `CompiledStateGraph::invoke`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Next {
    Continue,
    End,
}
