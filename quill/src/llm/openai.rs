//! OpenAI-compatible Chat Completions client implementing `LlmClient`.
//!
//! Uses `async_openai` (`Client<OpenAIConfig>`). Tools offered through
//! `invoke_with_tools` are sent as function tools; `tool_calls` in the reply
//! become pending calls on the resulting `Message::Ai`. Tool messages in the log
//! are sent back with their `tool_call_id` so the model sees each result.
//!
//! **Interaction**: Built from `ProviderSettings` by the CLI; used by
//! `AgentNode` like `MockLlm`.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionMessageToolCall, ChatCompletionMessageToolCalls,
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessage, ChatCompletionTool,
        ChatCompletionToolChoiceOption, ChatCompletionTools, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, FunctionCall, FunctionObject, ToolChoiceOptions,
    },
    Client,
};
use async_trait::async_trait;
use env_config::ProviderSettings;
use tracing::{debug, trace};

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse, LlmUsage, ToolChoiceMode};
use crate::message::Message;
use crate::state::ToolCall;
use crate::tool_source::ToolSpec;

/// OpenAI Chat Completions client.
#[derive(Clone)]
pub struct ChatOpenAI {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
    tool_choice: Option<ToolChoiceMode>,
}

impl std::fmt::Debug for ChatOpenAI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatOpenAI")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("tool_choice", &self.tool_choice)
            .finish()
    }
}

/// API base with a `/v1` suffix; not appended twice.
fn api_base(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if base.ends_with("/v1") {
        base.to_string()
    } else {
        format!("{}/v1", base)
    }
}

/// `OpenAIConfig` for `base_url`; without a key the config falls back to `OPENAI_API_KEY`.
pub(crate) fn openai_config(base_url: &str, api_key: Option<&str>) -> OpenAIConfig {
    let config = OpenAIConfig::new().with_api_base(api_base(base_url));
    match api_key {
        Some(key) => config.with_api_key(key),
        None => config,
    }
}

impl ChatOpenAI {
    /// Client for `model` at `base_url` (e.g. `https://api.openai.com/v1`).
    pub fn new(base_url: &str, api_key: Option<&str>, model: impl Into<String>) -> Self {
        Self::with_config(openai_config(base_url, api_key), model)
    }

    /// Client with a prepared `OpenAIConfig`.
    pub fn with_config(config: OpenAIConfig, model: impl Into<String>) -> Self {
        Self {
            client: Client::with_config(config),
            model: model.into(),
            temperature: None,
            tool_choice: None,
        }
    }

    /// Client for the chat model named in `settings`.
    pub fn from_settings(settings: &ProviderSettings) -> Self {
        Self::new(
            &settings.openai_base_url,
            settings.openai_api_key.as_deref(),
            settings.openai_model.clone(),
        )
    }

    /// Set temperature (0–2). Lower values are more deterministic.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set tool choice mode; only sent when tools are offered.
    pub fn with_tool_choice(mut self, mode: ToolChoiceMode) -> Self {
        self.tool_choice = Some(mode);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    fn build_request(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> Result<CreateChatCompletionRequest, AgentError> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.model.clone());
        args.messages(request_messages(messages)?);
        if !tools.is_empty() {
            let chat_tools: Vec<ChatCompletionTools> = tools
                .iter()
                .map(|t| {
                    ChatCompletionTools::Function(ChatCompletionTool {
                        function: FunctionObject {
                            name: t.name.clone(),
                            description: t.description.clone(),
                            parameters: Some(t.input_schema.clone()),
                            ..Default::default()
                        },
                    })
                })
                .collect();
            args.tools(chat_tools);
            if let Some(mode) = self.tool_choice {
                let option = match mode {
                    ToolChoiceMode::Auto => ToolChoiceOptions::Auto,
                    ToolChoiceMode::None => ToolChoiceOptions::None,
                    ToolChoiceMode::Required => ToolChoiceOptions::Required,
                };
                args.tool_choice(ChatCompletionToolChoiceOption::Mode(option));
            }
        }
        if let Some(t) = self.temperature {
            args.temperature(t);
        }
        args.build().map_err(build_failed)
    }
}

fn build_failed(e: impl std::fmt::Display) -> AgentError {
    AgentError::ExecutionFailed(format!("OpenAI request build failed: {}", e))
}

/// Human → user, Ai → assistant (with its tool calls), Tool → tool (`tool_call_id`
/// is the call id, or the tool name when the call carried none).
fn request_messages(messages: &[Message]) -> Result<Vec<ChatCompletionRequestMessage>, AgentError> {
    messages
        .iter()
        .map(|m| match m {
            Message::Human { content } => Ok(ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessage::from(content.as_str()),
            )),
            Message::Ai {
                content,
                tool_calls,
            } => {
                let mut args = ChatCompletionRequestAssistantMessageArgs::default();
                args.content(content.clone());
                if !tool_calls.is_empty() {
                    args.tool_calls(tool_calls.iter().map(wire_tool_call).collect::<Vec<_>>());
                }
                Ok(ChatCompletionRequestMessage::Assistant(
                    args.build().map_err(build_failed)?,
                ))
            }
            Message::Tool {
                content,
                call_id,
                name,
            } => {
                let message = ChatCompletionRequestToolMessageArgs::default()
                    .content(content.clone())
                    .tool_call_id(call_id.clone().unwrap_or_else(|| name.clone()))
                    .build()
                    .map_err(build_failed)?;
                Ok(ChatCompletionRequestMessage::Tool(message))
            }
        })
        .collect()
}

fn wire_tool_call(call: &ToolCall) -> ChatCompletionMessageToolCalls {
    ChatCompletionMessageToolCalls::Function(ChatCompletionMessageToolCall {
        id: call.id.clone().unwrap_or_else(|| call.name.clone()),
        function: FunctionCall {
            name: call.name.clone(),
            arguments: call.arguments.clone(),
        },
    })
}

/// Function calls become pending `ToolCall`s; other tool kinds are skipped.
fn pending_calls(calls: Vec<ChatCompletionMessageToolCalls>) -> Vec<ToolCall> {
    calls
        .into_iter()
        .filter_map(|tc| match tc {
            ChatCompletionMessageToolCalls::Function(f) => Some(ToolCall {
                id: Some(f.id),
                name: f.function.name,
                arguments: f.function.arguments,
            }),
            _ => None,
        })
        .collect()
}

#[async_trait]
impl LlmClient for ChatOpenAI {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        self.invoke_with_tools(messages, &[]).await
    }

    async fn invoke_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> Result<LlmResponse, AgentError> {
        let trace_id = uuid::Uuid::new_v4().to_string();
        let request = self.build_request(messages, tools)?;
        debug!(
            trace_id = %trace_id,
            model = %self.model,
            message_count = messages.len(),
            tools_count = tools.len(),
            temperature = ?self.temperature,
            "OpenAI chat create"
        );
        if let Ok(js) = serde_json::to_string_pretty(&request) {
            trace!(trace_id = %trace_id, request = %js, "OpenAI request body");
        }

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| AgentError::ExecutionFailed(format!("OpenAI API error: {}", e)))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::ExecutionFailed("OpenAI returned no choices".to_string()))?;
        let reply = LlmResponse {
            content: choice.message.content.unwrap_or_default(),
            tool_calls: pending_calls(choice.message.tool_calls.unwrap_or_default()),
            usage: response.usage.map(|u| LlmUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
        };
        debug!(
            trace_id = %trace_id,
            tool_calls = reply.tool_calls.len(),
            usage = ?reply.usage,
            "OpenAI chat complete"
        );
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn api_base_handles_v1_suffix() {
        assert_eq!(api_base("https://api.openai.com/v1/"), "https://api.openai.com/v1");
        assert_eq!(api_base("http://localhost:11434"), "http://localhost:11434/v1");
    }

    /// **Scenario**: the log maps to user/assistant/tool roles, with tool calls and ids preserved.
    #[test]
    fn request_maps_messages_and_tools() {
        let llm = ChatOpenAI::new("https://x/v1", Some("sk-test"), "gpt-4o")
            .with_tool_choice(ToolChoiceMode::Auto)
            .with_temperature(0.2);
        let call = ToolCall {
            id: Some("call-1".into()),
            name: "web_search".into(),
            arguments: r#"{"query":"rust"}"#.into(),
        };
        let messages = vec![
            Message::human("research rust"),
            Message::ai_with_tool_calls("", vec![call]),
            Message::tool("web_search", Some("call-1".into()), "results"),
        ];
        let tools = vec![ToolSpec {
            name: "web_search".into(),
            description: Some("Search the web".into()),
            input_schema: json!({"type": "object"}),
        }];
        let request = llm.build_request(&messages, &tools).unwrap();
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][1]["role"], "assistant");
        assert_eq!(
            body["messages"][1]["tool_calls"][0]["function"]["name"],
            "web_search"
        );
        assert_eq!(body["messages"][1]["tool_calls"][0]["id"], "call-1");
        assert_eq!(body["messages"][2]["role"], "tool");
        assert_eq!(body["messages"][2]["tool_call_id"], "call-1");
        assert_eq!(body["tools"][0]["function"]["name"], "web_search");
        assert!(body.get("tool_choice").is_some());
        assert!(body.get("temperature").is_some());
    }

    #[test]
    fn request_without_tools_omits_tool_fields() {
        let llm = ChatOpenAI::new("https://x/v1", None, "m").with_tool_choice(ToolChoiceMode::Required);
        let request = llm.build_request(&[Message::human("hi")], &[]).unwrap();
        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("tools").map_or(true, |v| v.is_null()));
        assert!(body.get("tool_choice").map_or(true, |v| v.is_null()));
        assert_eq!(llm.temperature(), None);
    }

    /// **Scenario**: a tool message whose call had no id is answered under the tool name.
    #[test]
    fn tool_message_without_call_id_uses_name() {
        let messages = vec![Message::tool("web_search", None, "results")];
        let body = serde_json::to_value(request_messages(&messages).unwrap()).unwrap();
        assert_eq!(body[0]["tool_call_id"], "web_search");
    }

    #[test]
    fn reply_function_calls_become_pending_calls() {
        let calls = vec![ChatCompletionMessageToolCalls::Function(
            ChatCompletionMessageToolCall {
                id: "call-9".into(),
                function: FunctionCall {
                    name: "generate_article_image".into(),
                    arguments: r#"{"prompt":"a"}"#.into(),
                },
            },
        )];
        let pending = pending_calls(calls);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id.as_deref(), Some("call-9"));
        assert_eq!(pending[0].name, "generate_article_image");
    }
}
