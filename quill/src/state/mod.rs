//! Shared state for the article graph and the tool/image types carried in it.
//!
//! [`ArticleState`] is threaded through every node; [`ArticleStateUpdater`] merges
//! each node's partial output. [`ToolCall`] and [`ToolResult`] align with the
//! `ToolSource::call_tool` request and its textual result.

mod article_state;

pub use article_state::{
    ArticleState, ArticleStateUpdater, OutputSlot, StateField, DEFAULT_WORD_COUNT,
};

use serde::{Deserialize, Serialize};

/// A single tool invocation requested by a model reply.
///
/// `arguments` is the raw JSON string from the model; the tool node parses it
/// before calling `ToolSource::call_tool(name, arguments)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned id; echoed on the matching tool message.
    pub id: Option<String>,
    /// Tool name as listed by the tool source (e.g. `web_search`).
    pub name: String,
    /// Arguments as JSON string.
    pub arguments: String,
}

/// Result of executing one tool call; becomes a `Message::Tool`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Id of the tool call this result answers, when the call had one.
    pub call_id: Option<String>,
    pub name: String,
    /// Result text, or an error description when the tool failed.
    pub content: String,
}

/// Outcome of one image generation request.
///
/// Failures still produce a value: `url` points at a placeholder and `error`
/// carries the cause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageResult {
    pub url: String,
    pub prompt: String,
    pub style: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ImageResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
