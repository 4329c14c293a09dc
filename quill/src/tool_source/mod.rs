//! Tool source abstraction: list tools and call a tool.
//!
//! Agents and tool nodes depend on [`ToolSource`] rather than on concrete
//! services. Implementations:
//!
//! - [`WebSearchToolSource`]: the `web_search` tool over any [`SearchClient`]
//!   (e.g. [`TavilySearch`]). Search failures come back as result text.
//! - [`ImageToolSource`]: the `generate_article_image` tool over any
//!   [`ImageGenerator`] (e.g. [`DallEImageGenerator`]). Failures come back as an
//!   [`ImageResult`](crate::state::ImageResult) with a placeholder URL.
//! - [`MockToolSource`]: fixed tool list and result, for tests.

mod dalle;
mod image;
mod mock;
mod tavily;
mod web_search;

pub use dalle::DallEImageGenerator;
pub use image::{
    ImageGenerator, ImageToolSource, DEFAULT_IMAGE_STYLE, PLACEHOLDER_IMAGE_URL,
    TOOL_GENERATE_ARTICLE_IMAGE,
};
pub use mock::MockToolSource;
pub use tavily::{TavilyError, TavilySearch};
pub use web_search::{SearchClient, WebSearchToolSource, TOOL_WEB_SEARCH};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Tool specification offered to the model (name, description, JSON Schema).
///
/// **Interaction**: Returned by `ToolSource::list_tools()`; bound to a model via
/// `llm::bind_tools`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolSpec {
    pub name: String,
    /// Human-readable description for the LLM.
    pub description: Option<String>,
    /// JSON Schema for arguments.
    pub input_schema: Value,
}

/// Result text of a single tool call.
///
/// **Interaction**: Returned by `ToolSource::call_tool()`; `ToolNode` wraps it in
/// a `Message::Tool`.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallContent {
    pub text: String,
}

/// Errors from listing or calling tools.
///
/// `ToolNode` never propagates these: it records the error text as the tool
/// message so the requesting agent can react.
#[derive(Debug, Error)]
pub enum ToolSourceError {
    #[error("tool not found: {0}")]
    NotFound(String),
    #[error("invalid arguments: {0}")]
    InvalidInput(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("missing credentials: {0}")]
    MissingCredentials(String),
}

/// Tool source: list tools and call a tool by name.
#[async_trait]
pub trait ToolSource: Send + Sync {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError>;

    /// Call a tool by name with JSON arguments.
    async fn call_tool(&self, name: &str, arguments: Value)
        -> Result<ToolCallContent, ToolSourceError>;
}

/// Reads a required string argument.
pub(crate) fn required_str<'a>(arguments: &'a Value, key: &str) -> Result<&'a str, ToolSourceError> {
    arguments
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolSourceError::InvalidInput(format!("missing string argument `{}`", key)))
}
