//! Language-model capability used by agent nodes.
//!
//! `AgentNode` depends on a callable that returns assistant text and optional
//! tool calls; this module defines that trait ([`LlmClient`]), a tool-bound
//! wrapper ([`bind_tools`]), a scripted mock for tests and an
//! OpenAI-compatible HTTP client.

mod mock;
mod openai;

pub use mock::MockLlm;
pub use openai::ChatOpenAI;
pub(crate) use openai::openai_config;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::message::Message;
use crate::state::ToolCall;
use crate::tool_source::ToolSpec;

/// Tool choice mode for chat completions: when tools are present, controls whether
/// the model may choose (auto), must not use (none), or must use (required).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ToolChoiceMode {
    #[default]
    Auto,
    None,
    Required,
}

impl ToolChoiceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::None => "none",
            Self::Required => "required",
        }
    }
}

impl std::str::FromStr for ToolChoiceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "none" => Ok(Self::None),
            "required" => Ok(Self::Required),
            _ => Err(format!(
                "unknown tool_choice: {} (use auto, none, or required)",
                s
            )),
        }
    }
}

/// Token usage for one model call.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LlmUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// One model reply: assistant text and the tool calls it requests.
///
/// **Interaction**: Returned by `LlmClient::invoke`; `AgentNode` turns it into a
/// `Message::Ai` carrying `tool_calls` as pending calls.
#[derive(Clone, Debug, Default)]
pub struct LlmResponse {
    pub content: String,
    /// Empty when the model requested no tools.
    pub tool_calls: Vec<ToolCall>,
    pub usage: Option<LlmUsage>,
}

impl LlmResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }
}

/// Language model: given the message log, returns one assistant reply.
///
/// Implementations: `MockLlm` (scripted), `ChatOpenAI` (HTTP). Failures are
/// `AgentError::ExecutionFailed` and abort the current run attempt.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// One turn without tools.
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError>;

    /// One turn with `tools` offered to the model.
    ///
    /// Default implementation ignores `tools` and calls `invoke`.
    async fn invoke_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> Result<LlmResponse, AgentError> {
        let _ = tools;
        self.invoke(messages).await
    }
}

/// A model with a fixed tool list: every `invoke` offers those tools.
pub struct ToolBoundLlm {
    inner: Arc<dyn LlmClient>,
    tools: Vec<ToolSpec>,
}

impl ToolBoundLlm {
    pub fn tools(&self) -> &[ToolSpec] {
        &self.tools
    }
}

#[async_trait]
impl LlmClient for ToolBoundLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        self.inner.invoke_with_tools(messages, &self.tools).await
    }

    async fn invoke_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> Result<LlmResponse, AgentError> {
        let mut all = self.tools.clone();
        all.extend(
            tools
                .iter()
                .filter(|t| !self.tools.iter().any(|b| b.name == t.name))
                .cloned(),
        );
        self.inner.invoke_with_tools(messages, &all).await
    }
}

/// Binds `tools` to `llm` so agents can call it without knowing about tools.
pub fn bind_tools(llm: Arc<dyn LlmClient>, tools: Vec<ToolSpec>) -> Arc<dyn LlmClient> {
    Arc::new(ToolBoundLlm { inner: llm, tools })
}
