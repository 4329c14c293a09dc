//! State graph: nodes, static and conditional edges, compile and invoke.
//!
//! Build a [`StateGraph`], compile it, then [`CompiledStateGraph::invoke`] it with
//! an initial state. Runs are sequential, bounded by a step budget and an
//! optional deadline (see [`RunConfig`]).

mod compile_error;
mod compiled;
mod conditional;
mod logging;
mod next;
mod node;
mod node_middleware;
mod run_context;
mod state_graph;
mod updater;
mod visualization;

pub use compile_error::CompilationError;
pub use compiled::CompiledStateGraph;
pub use conditional::{ConditionalRouter, ConditionalRouterFn, NextEntry};
pub use logging::{
    log_graph_complete, log_graph_error, log_graph_start, log_node_complete, log_node_start,
    log_node_state, log_route, log_state_update,
};
pub use next::Next;
pub use node::Node;
pub use node_middleware::{NodeCall, NodeMiddleware};
pub use run_context::{RunConfig, RunContext};
pub use state_graph::{StateGraph, DEFAULT_MAX_STEPS, END, START};
pub use updater::{BoxedStateUpdater, ReplaceUpdater, StateUpdater};
pub use visualization::{generate_dot, generate_text};
