//! `web_search` tool: one `query` argument, results returned as text.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{required_str, ToolCallContent, ToolSource, ToolSourceError, ToolSpec};

/// Tool name offered to the researcher.
pub const TOOL_WEB_SEARCH: &str = "web_search";

/// Anything that can turn a query into a block of result text.
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, query: &str) -> Result<String, ToolSourceError>;
}

/// Exposes a [`SearchClient`] as the `web_search` tool.
///
/// A failed search is not an error: the call returns `"Web search failed: {e}"`
/// so the researcher sees it in the log.
pub struct WebSearchToolSource {
    client: Arc<dyn SearchClient>,
}

impl WebSearchToolSource {
    pub fn new(client: Arc<dyn SearchClient>) -> Self {
        Self { client }
    }

    pub fn spec() -> ToolSpec {
        ToolSpec {
            name: TOOL_WEB_SEARCH.to_string(),
            description: Some(
                "Useful for when you need to answer questions by searching the web. \
                 Input should be a search query."
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "The search query" }
                },
                "required": ["query"]
            }),
        }
    }
}

#[async_trait]
impl ToolSource for WebSearchToolSource {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError> {
        Ok(vec![Self::spec()])
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolCallContent, ToolSourceError> {
        if name != TOOL_WEB_SEARCH {
            return Err(ToolSourceError::NotFound(name.to_string()));
        }
        let query = required_str(&arguments, "query")?;
        debug!(query = %query, "web search");
        let text = match self.client.search(query).await {
            Ok(results) => results,
            Err(e) => {
                warn!(error = %e, "web search failed");
                format!("Web search failed: {}", e)
            }
        };
        Ok(ToolCallContent { text })
    }
}
