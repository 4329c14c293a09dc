//! Tool node: execute the pending calls of the last AI message.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::message::Message;
use crate::state::{ArticleState, ImageResult, ToolCall, ToolResult};
use crate::tool_source::ToolSource;

/// Runs every pending tool call, in order, and appends one tool message per call.
///
/// Tool failures (bad arguments, unknown tool, transport) never abort the run:
/// the error text becomes the tool message. The image variant also collects
/// successful `ImageResult`s into `generated_images`.
///
/// **Interaction**: Implements `Node<ArticleState>`; reached from a `ToolRouter`
/// and routed back to the requesting agent by a static edge.
pub struct ToolNode {
    id: String,
    source: Arc<dyn ToolSource>,
    collect_images: bool,
}

impl ToolNode {
    pub fn new(id: impl Into<String>, source: Arc<dyn ToolSource>) -> Self {
        Self {
            id: id.into(),
            source,
            collect_images: false,
        }
    }

    /// Tool node whose results are `ImageResult` JSON.
    pub fn images(id: impl Into<String>, source: Arc<dyn ToolSource>) -> Self {
        Self {
            collect_images: true,
            ..Self::new(id, source)
        }
    }

    async fn execute(&self, call: &ToolCall) -> String {
        let arguments: Value = if call.arguments.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            match serde_json::from_str(&call.arguments) {
                Ok(v) => v,
                Err(e) => {
                    warn!(node = %self.id, tool = %call.name, error = %e, "invalid tool arguments");
                    return format!("Error: invalid arguments for {}: {}", call.name, e);
                }
            }
        };
        match self.source.call_tool(&call.name, arguments).await {
            Ok(content) => content.text,
            Err(e) => {
                warn!(node = %self.id, tool = %call.name, error = %e, "tool call failed");
                format!("Error: {}", e)
            }
        }
    }
}

#[async_trait]
impl Node<ArticleState> for ToolNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn run(&self, state: ArticleState) -> Result<(ArticleState, Next), AgentError> {
        let mut update = ArticleState::default();
        let calls = match state.last_message() {
            Some(m) => m.pending_tool_calls(),
            None => &[],
        };
        if calls.is_empty() {
            debug!(node = %self.id, "no pending tool calls");
            return Ok((update, Next::Continue));
        }

        let mut images = Vec::new();
        for call in calls {
            let content = self.execute(call).await;
            if self.collect_images {
                match serde_json::from_str::<ImageResult>(&content) {
                    Ok(image) if image.is_success() => images.push(image),
                    Ok(image) => debug!(node = %self.id, error = ?image.error, "image not collected"),
                    Err(_) => debug!(node = %self.id, "tool result is not an image result"),
                }
            }
            update.messages.push(Message::from(ToolResult {
                call_id: call.id.clone(),
                name: call.name.clone(),
                content,
            }));
        }
        debug!(node = %self.id, calls = calls.len(), images = images.len(), "tool calls executed");
        if !images.is_empty() {
            update.generated_images = Some(images);
        }
        Ok((update, Next::Continue))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool_source::MockToolSource;
    use serde_json::json;

    fn call(id: &str, name: &str, args: &str) -> ToolCall {
        ToolCall {
            id: Some(id.into()),
            name: name.into(),
            arguments: args.into(),
        }
    }

    fn state_with_calls(calls: Vec<ToolCall>) -> ArticleState {
        let mut state = ArticleState::new("t", None);
        state.messages.push(Message::ai_with_tool_calls("", calls));
        state
    }

    /// **Scenario**: two calls yield two tool messages in call order, ids echoed.
    #[tokio::test]
    async fn executes_calls_in_order() {
        let source = Arc::new(MockToolSource::single("web_search", "query", "hits"));
        let node = ToolNode::new("web_search", source.clone());
        let state = state_with_calls(vec![
            call("c1", "web_search", r#"{"query":"a"}"#),
            call("c2", "web_search", r#"{"query":"b"}"#),
        ]);
        let (update, _) = node.run(state).await.unwrap();
        assert_eq!(
            update.messages,
            vec![
                Message::tool("web_search", Some("c1".into()), "hits"),
                Message::tool("web_search", Some("c2".into()), "hits"),
            ]
        );
        let calls = source.calls();
        assert_eq!(calls[0].1, json!({"query": "a"}));
        assert_eq!(calls[1].1, json!({"query": "b"}));
    }

    #[tokio::test]
    async fn no_pending_calls_is_noop() {
        let source = Arc::new(MockToolSource::single("web_search", "query", "hits"));
        let node = ToolNode::new("web_search", source.clone());
        let mut state = ArticleState::new("t", None);
        state.messages.push(Message::ai("done"));
        let (update, _) = node.run(state).await.unwrap();
        assert_eq!(update, ArticleState::default());
        assert!(source.calls().is_empty());
        let (update, _) = node.run(ArticleState::new("t", None)).await.unwrap();
        assert!(update.messages.is_empty());
    }

    /// **Scenario**: tool errors and bad arguments become tool messages, never node errors.
    #[tokio::test]
    async fn failures_become_tool_messages() {
        let source = Arc::new(MockToolSource::single("web_search", "query", "x").failing("offline"));
        let node = ToolNode::new("web_search", source);
        let state = state_with_calls(vec![
            call("c1", "web_search", r#"{"query":"a"}"#),
            call("c2", "web_search", "{not json"),
        ]);
        let (update, _) = node.run(state).await.unwrap();
        assert_eq!(update.messages.len(), 2);
        assert!(update.messages[0].content().contains("offline"));
        assert!(update.messages[1].content().contains("invalid arguments"));
    }

    /// **Scenario**: only successful image results are collected.
    #[tokio::test]
    async fn image_variant_collects_successes() {
        let ok = ImageResult {
            url: "https://img/1.png".into(),
            prompt: "p".into(),
            style: "photorealistic".into(),
            error: None,
        };
        let source = Arc::new(MockToolSource::single(
            "generate_article_image",
            "prompt",
            serde_json::to_string(&ok).unwrap(),
        ));
        let node = ToolNode::images("image_generation", source);
        let state = state_with_calls(vec![call("c1", "generate_article_image", r#"{"prompt":"p"}"#)]);
        let (update, _) = node.run(state).await.unwrap();
        assert_eq!(update.generated_images, Some(vec![ok]));

        let failed = ImageResult {
            url: crate::tool_source::PLACEHOLDER_IMAGE_URL.into(),
            prompt: "p".into(),
            style: "photorealistic".into(),
            error: Some("quota".into()),
        };
        let source = Arc::new(MockToolSource::single(
            "generate_article_image",
            "prompt",
            serde_json::to_string(&failed).unwrap(),
        ));
        let node = ToolNode::images("image_generation", source);
        let state = state_with_calls(vec![call("c1", "generate_article_image", r#"{"prompt":"p"}"#)]);
        let (update, _) = node.run(state).await.unwrap();
        assert!(update.generated_images.is_none());
        assert_eq!(update.messages.len(), 1);
    }
}
