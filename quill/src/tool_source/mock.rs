//! Mock tool source for tests: fixed tool list and a fixed (or failing) result.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{ToolCallContent, ToolSource, ToolSourceError, ToolSpec};

/// Returns the same result for every call and records what was called.
#[derive(Debug)]
pub struct MockToolSource {
    tools: Vec<ToolSpec>,
    result: Result<String, String>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockToolSource {
    /// `tools` are listed; every `call_tool` returns `call_result`.
    pub fn new(tools: Vec<ToolSpec>, call_result: impl Into<String>) -> Self {
        Self {
            tools,
            result: Ok(call_result.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// One tool named `name` taking a single string argument `arg`.
    pub fn single(name: &str, arg: &str, call_result: impl Into<String>) -> Self {
        Self::new(
            vec![ToolSpec {
                name: name.to_string(),
                description: Some(format!("Mock tool {}", name)),
                input_schema: json!({
                    "type": "object",
                    "properties": { arg: { "type": "string" } },
                    "required": [arg]
                }),
            }],
            call_result,
        )
    }

    /// Every call fails with a transport error carrying `message`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.result = Err(message.into());
        self
    }

    /// (name, arguments) of every call, in order.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls
            .lock()
            .map(|c| c.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

#[async_trait]
impl ToolSource for MockToolSource {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError> {
        Ok(self.tools.clone())
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolCallContent, ToolSourceError> {
        match self.calls.lock() {
            Ok(mut calls) => calls.push((name.to_string(), arguments)),
            Err(poisoned) => poisoned.into_inner().push((name.to_string(), arguments)),
        }
        match &self.result {
            Ok(text) => Ok(ToolCallContent { text: text.clone() }),
            Err(message) => Err(ToolSourceError::Transport(message.clone())),
        }
    }
}
