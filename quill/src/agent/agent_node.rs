//! Agent node: bind inputs, render the prompt, call the model once.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::llm::LlmClient;
use crate::message::Message;
use crate::prompts::PromptTemplate;
use crate::state::{ArticleState, OutputSlot, StateField};

/// Where a bound prompt input may come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    /// A state field; absent when the slot was never written.
    State(StateField),
    /// Content of the most recent AI message in the log.
    LastAiMessage,
}

/// One prompt input: the template slot name and its ordered sources.
/// The first source that yields a value wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinding {
    name: String,
    sources: Vec<FieldSource>,
}

impl FieldBinding {
    pub fn new(name: impl Into<String>, sources: Vec<FieldSource>) -> Self {
        Self {
            name: name.into(),
            sources,
        }
    }

    /// Binds the slot named after `field` to that state field.
    pub fn state(field: StateField) -> Self {
        Self::new(field.name(), vec![FieldSource::State(field)])
    }

    /// Adds the last AI message as a fallback source.
    pub fn or_last_ai_message(mut self) -> Self {
        self.sources.push(FieldSource::LastAiMessage);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sources(&self) -> &[FieldSource] {
        &self.sources
    }

    fn resolve(&self, state: &ArticleState) -> Option<String> {
        self.sources.iter().find_map(|source| match source {
            FieldSource::State(field) => state.field(*field),
            FieldSource::LastAiMessage => state.last_ai_content().map(str::to_string),
        })
    }
}

/// Agent node: one model turn per visit.
///
/// Resolves its bindings (`topic` is always bound), renders the template, sends
/// the full log plus one human message with the prompt, and returns a partial
/// state holding only the reply (and the output slot when configured).
///
/// **Interaction**: Implements `Node<ArticleState>`; followed by a `ToolRouter`
/// when the model has tools bound.
pub struct AgentNode {
    id: String,
    llm: Arc<dyn LlmClient>,
    template: PromptTemplate,
    bindings: Vec<FieldBinding>,
    output: Option<OutputSlot>,
}

impl AgentNode {
    pub fn new(id: impl Into<String>, llm: Arc<dyn LlmClient>, template: PromptTemplate) -> Self {
        Self {
            id: id.into(),
            llm,
            template,
            bindings: vec![FieldBinding::state(StateField::Topic)],
            output: None,
        }
    }

    /// Declares a required input. A binding with the same name replaces the earlier one.
    pub fn require(mut self, binding: FieldBinding) -> Self {
        self.bindings.retain(|b| b.name != binding.name);
        self.bindings.push(binding);
        self
    }

    /// Slot that receives the reply content.
    pub fn output(mut self, slot: OutputSlot) -> Self {
        self.output = Some(slot);
        self
    }

    pub fn bindings(&self) -> &[FieldBinding] {
        &self.bindings
    }

    fn resolve_inputs(&self, state: &ArticleState) -> Result<HashMap<String, String>, AgentError> {
        self.bindings
            .iter()
            .map(|b| {
                b.resolve(state)
                    .map(|v| (b.name.clone(), v))
                    .ok_or_else(|| AgentError::MissingField {
                        node: self.id.clone(),
                        field: b.name.clone(),
                    })
            })
            .collect()
    }
}

#[async_trait]
impl Node<ArticleState> for AgentNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn run(&self, state: ArticleState) -> Result<(ArticleState, Next), AgentError> {
        let inputs = self.resolve_inputs(&state)?;
        let prompt = self.template.render(&inputs)?;

        let mut input = state.messages;
        input.push(Message::human(prompt));
        let response = self.llm.invoke(&input).await?;
        debug!(
            node = %self.id,
            content_len = response.content.len(),
            tool_calls = response.tool_calls.len(),
            "agent reply"
        );

        let mut update = ArticleState::default();
        if let Some(slot) = self.output {
            slot.write(&mut update, response.content.clone());
        }
        update
            .messages
            .push(Message::ai_with_tool_calls(response.content, response.tool_calls));
        Ok((update, Next::Continue))
    }
}
