//! Message types for the shared message log.
//!
//! Roles: Human (rendered prompts), Ai (model replies, possibly carrying pending
//! tool calls), Tool (one result per executed tool call).
//! Used by `ArticleState::messages`; agents append Human/Ai, tool nodes append Tool.

use serde::{Deserialize, Serialize};

use crate::state::{ToolCall, ToolResult};

/// A single entry in the message log.
///
/// Pending tool calls are a typed, possibly empty list on `Ai`; routers check
/// its length rather than probing for presence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    /// Prompt sent to a model.
    Human { content: String },
    /// Model reply; `tool_calls` are requests not yet satisfied.
    Ai {
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    /// Result of one tool call, in call order.
    Tool {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        call_id: Option<String>,
        name: String,
    },
}

impl Message {
    /// Creates a human message.
    pub fn human(content: impl Into<String>) -> Self {
        Self::Human {
            content: content.into(),
        }
    }

    /// Creates an AI message without tool calls.
    pub fn ai(content: impl Into<String>) -> Self {
        Self::Ai {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Creates an AI message carrying pending tool calls.
    pub fn ai_with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self::Ai {
            content: content.into(),
            tool_calls,
        }
    }

    /// Creates a tool message.
    pub fn tool(name: impl Into<String>, call_id: Option<String>, content: impl Into<String>) -> Self {
        Self::Tool {
            content: content.into(),
            call_id,
            name: name.into(),
        }
    }

    /// Text content of any variant.
    pub fn content(&self) -> &str {
        match self {
            Self::Human { content } | Self::Ai { content, .. } | Self::Tool { content, .. } => {
                content
            }
        }
    }

    pub fn is_ai(&self) -> bool {
        matches!(self, Self::Ai { .. })
    }

    /// Pending tool calls; empty for non-AI messages.
    pub fn pending_tool_calls(&self) -> &[ToolCall] {
        match self {
            Self::Ai { tool_calls, .. } => tool_calls,
            _ => &[],
        }
    }
}

impl From<ToolResult> for Message {
    fn from(result: ToolResult) -> Self {
        Self::Tool {
            content: result.content,
            call_id: result.call_id,
            name: result.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: constructors produce the correct variant with content.
    #[test]
    fn message_constructors() {
        assert!(matches!(&Message::human("h"), Message::Human { content } if content == "h"));
        let ai = Message::ai("a");
        assert!(ai.is_ai());
        assert!(ai.pending_tool_calls().is_empty());
        let tool = Message::tool("web_search", Some("c1".into()), "r");
        assert_eq!(tool.content(), "r");
        assert!(!tool.is_ai());
    }

    /// **Scenario**: pending_tool_calls only reports calls on Ai messages.
    #[test]
    fn pending_tool_calls_only_on_ai() {
        let call = ToolCall {
            id: Some("call-1".into()),
            name: "web_search".into(),
            arguments: r#"{"query":"x"}"#.into(),
        };
        let ai = Message::ai_with_tool_calls("", vec![call]);
        assert_eq!(ai.pending_tool_calls().len(), 1);
        assert!(Message::human("q").pending_tool_calls().is_empty());
    }

    /// **Scenario**: the serialized form is tagged by role and omits empty tool calls.
    #[test]
    fn message_serializes_with_role_tag() {
        let json = serde_json::to_value(Message::ai("done")).expect("serialize");
        assert_eq!(json["role"], "ai");
        assert!(json.get("tool_calls").is_none());
        let back: Message = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, Message::ai("done"));
    }

    #[test]
    fn tool_result_converts_to_tool_message() {
        let msg: Message = ToolResult {
            call_id: Some("c".into()),
            name: "web_search".into(),
            content: "results".into(),
        }
        .into();
        assert!(matches!(msg, Message::Tool { ref name, .. } if name == "web_search"));
        assert_eq!(msg.content(), "results");
    }
}
