//! Routing after an agent: to its tool node when tool calls are pending, else forward.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::graph::ConditionalRouterFn;
use crate::message::Message;
use crate::state::ArticleState;

/// Outcome of [`tools_condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolsConditionResult {
    /// The last AI message has pending tool calls.
    Tools,
    /// Nothing to execute; continue with the forward node.
    Continue,
}

impl ToolsConditionResult {
    /// Routing key used in path maps: `"tools"` or `"continue"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tools => "tools",
            Self::Continue => "continue",
        }
    }
}

/// The log does not end in an AI message, so there is nothing to inspect.
///
/// Never returned by a router: [`ToolRouter`] logs it and forwards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    #[error("message log is empty")]
    EmptyLog,
    #[error("last message is not an AI message")]
    NotAiMessage,
}

/// Inspects the last message of `messages`.
pub fn tools_condition(messages: &[Message]) -> Result<ToolsConditionResult, RoutingError> {
    let last = messages.last().ok_or(RoutingError::EmptyLog)?;
    if !last.is_ai() {
        return Err(RoutingError::NotAiMessage);
    }
    if last.pending_tool_calls().is_empty() {
        Ok(ToolsConditionResult::Continue)
    } else {
        Ok(ToolsConditionResult::Tools)
    }
}

/// Router instance: tool node on pending calls, forward node otherwise (may be END).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolRouter {
    tool_node: String,
    forward: String,
}

impl ToolRouter {
    pub fn new(tool_node: impl Into<String>, forward: impl Into<String>) -> Self {
        Self {
            tool_node: tool_node.into(),
            forward: forward.into(),
        }
    }

    /// Routing key for `state`; routing errors are logged and fall back to `"continue"`.
    pub fn key(&self, state: &ArticleState) -> ToolsConditionResult {
        match tools_condition(&state.messages) {
            Ok(ToolsConditionResult::Tools) => {
                info!(to = %self.tool_node, "tool calls detected");
                ToolsConditionResult::Tools
            }
            Ok(result) => result,
            Err(RoutingError::EmptyLog) => {
                warn!(forward = %self.forward, "routing error: message log is empty, continuing");
                ToolsConditionResult::Continue
            }
            Err(e) => {
                debug!(forward = %self.forward, error = %e, "routing without AI message, continuing");
                ToolsConditionResult::Continue
            }
        }
    }

    /// Next node id for `state`.
    pub fn route(&self, state: &ArticleState) -> String {
        match self.key(state) {
            ToolsConditionResult::Tools => self.tool_node.clone(),
            ToolsConditionResult::Continue => self.forward.clone(),
        }
    }

    /// Key-to-node map for `StateGraph::add_conditional_edges`.
    pub fn path_map(&self) -> HashMap<String, String> {
        [
            (ToolsConditionResult::Tools.as_str().to_string(), self.tool_node.clone()),
            (ToolsConditionResult::Continue.as_str().to_string(), self.forward.clone()),
        ]
        .into_iter()
        .collect()
    }

    /// Routing function returning the key; pair it with [`path_map`](Self::path_map).
    pub fn router_fn(&self) -> ConditionalRouterFn<ArticleState> {
        let router = self.clone();
        Arc::new(move |state: &ArticleState| router.key(state).as_str().to_string())
    }
}
