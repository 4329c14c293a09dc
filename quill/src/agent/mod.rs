//! Nodes and routing for the article graph.
//!
//! - [`AgentNode`]: renders its prompt from declared [`FieldBinding`]s, calls the
//!   model once and writes the reply into the log (and optionally an output slot).
//! - [`ToolNode`]: executes the pending tool calls of the last AI message.
//! - [`ToolRouter`] / [`tools_condition`]: after an agent, go to its tool node
//!   when the last AI message has pending calls, otherwise forward.
//!
//! # Routing
//!
//! ```rust,ignore
//! let router = ToolRouter::new("web_search", "write");
//! graph.add_conditional_edges("research", router.router_fn(), Some(router.path_map()));
//! graph.add_edge("web_search", "research");
//! ```

mod agent_node;
mod router;
mod tool_node;

pub use agent_node::{AgentNode, FieldBinding, FieldSource};
pub use router::{tools_condition, RoutingError, ToolRouter, ToolsConditionResult};
pub use tool_node::ToolNode;
