//! Scripted language model for tests and offline runs.
//!
//! Replies come from a script: call `n` gets entry `n`, and the last entry
//! repeats once the script runs out. Entries may be failures. Every call is
//! recorded (input messages and offered tools) so tests can assert what a node
//! sent to the model.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse};
use crate::message::Message;
use crate::state::ToolCall;
use crate::tool_source::ToolSpec;

#[derive(Clone, Debug)]
enum Scripted {
    Reply(LlmResponse),
    Fail(String),
}

/// Mock LLM: scripted replies plus call recording.
///
/// **Interaction**: Implements `LlmClient`; used in place of `ChatOpenAI` by
/// node and workflow tests.
#[derive(Debug)]
pub struct MockLlm {
    script: Vec<Scripted>,
    calls: AtomicUsize,
    inputs: Mutex<Vec<Vec<Message>>>,
    tools: Mutex<Vec<Vec<ToolSpec>>>,
}

impl MockLlm {
    fn from_script(script: Vec<Scripted>) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
            inputs: Mutex::new(Vec::new()),
            tools: Mutex::new(Vec::new()),
        }
    }

    /// Always replies with `content` and no tool calls.
    pub fn with_no_tool_calls(content: impl Into<String>) -> Self {
        Self::from_script(vec![Scripted::Reply(LlmResponse::text(content))])
    }

    /// Always replies with `content` and `tool_calls`.
    pub fn new(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self::from_script(vec![Scripted::Reply(LlmResponse {
            content: content.into(),
            tool_calls,
            usage: None,
        })])
    }

    /// First reply requests `call`; every later reply is `final_content` without calls.
    pub fn first_tools_then_end(call: ToolCall, final_content: impl Into<String>) -> Self {
        Self::scripted(vec![
            LlmResponse {
                content: String::new(),
                tool_calls: vec![call],
                usage: None,
            },
            LlmResponse::text(final_content),
        ])
    }

    /// Replies in order; the last one repeats. An empty script replies with empty text.
    pub fn scripted(replies: Vec<LlmResponse>) -> Self {
        let mut script: Vec<Scripted> = replies.into_iter().map(Scripted::Reply).collect();
        if script.is_empty() {
            script.push(Scripted::Reply(LlmResponse::default()));
        }
        Self::from_script(script)
    }

    /// Every call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::from_script(vec![Scripted::Fail(message.into())])
    }

    /// The first `n` calls fail, then every call replies with `content`.
    pub fn fail_first(n: usize, content: impl Into<String>) -> Self {
        let mut script: Vec<Scripted> = (0..n)
            .map(|i| Scripted::Fail(format!("scripted failure {}", i + 1)))
            .collect();
        script.push(Scripted::Reply(LlmResponse::text(content)));
        Self::from_script(script)
    }

    /// Number of completed `invoke`/`invoke_with_tools` calls.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Messages sent on the most recent call; empty before the first call.
    pub fn last_input(&self) -> Vec<Message> {
        lock(&self.inputs).last().cloned().unwrap_or_default()
    }

    /// Inputs of every call, in call order.
    pub fn inputs(&self) -> Vec<Vec<Message>> {
        lock(&self.inputs).clone()
    }

    /// Tools offered on the most recent call.
    pub fn last_tools(&self) -> Vec<ToolSpec> {
        lock(&self.tools).last().cloned().unwrap_or_default()
    }

    fn next_reply(&self, messages: &[Message], tools: &[ToolSpec]) -> Result<LlmResponse, AgentError> {
        lock(&self.inputs).push(messages.to_vec());
        lock(&self.tools).push(tools.to_vec());
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        let idx = n.min(self.script.len().saturating_sub(1));
        match self.script.get(idx) {
            Some(Scripted::Reply(r)) => Ok(r.clone()),
            Some(Scripted::Fail(msg)) => Err(AgentError::ExecutionFailed(msg.clone())),
            None => Ok(LlmResponse::default()),
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        self.next_reply(messages, &[])
    }

    async fn invoke_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> Result<LlmResponse, AgentError> {
        self.next_reply(messages, tools)
    }
}
