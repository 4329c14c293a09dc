//! # Quill
//!
//! An article pipeline on a small state-graph core. A researcher agent gathers
//! material (optionally via web search), a writer drafts the article and an
//! editor polishes it in a chosen style (optionally requesting illustrations).
//! One shared state type, [`ArticleState`], flows through every node.
//!
//! ## Design
//!
//! - **Partial updates**: nodes return only what they add; [`ArticleStateUpdater`]
//!   merges it (messages appended, output slots last-writer-wins, images accumulated).
//! - **Tool loops**: each agent may request tools; [`ToolRouter`] sends the run to the
//!   agent's [`ToolNode`] and back, or forward to the next stage.
//! - **Bounded runs**: cycles are allowed, so every run carries a step budget and an
//!   optional deadline ([`RunConfig`]).
//! - **Capabilities at the seams**: models ([`LlmClient`]) and tools ([`ToolSource`]) are
//!   traits; [`MockLlm`] and [`MockToolSource`] make the pipeline testable offline.
//!
//! ## Main modules
//!
//! - [`graph`]: [`StateGraph`], [`CompiledStateGraph`], [`Node`], [`Next`], [`NodeMiddleware`].
//! - [`state`]: [`ArticleState`], [`ToolCall`], [`ToolResult`], [`ImageResult`].
//! - [`agent`]: [`AgentNode`], [`ToolNode`], [`ToolRouter`], [`tools_condition`].
//! - [`llm`]: [`LlmClient`], [`ChatOpenAI`], [`MockLlm`].
//! - [`tool_source`]: [`ToolSource`], web search ([`TavilySearch`]) and image generation
//!   ([`DallEImageGenerator`]).
//! - [`prompts`]: YAML prompt set with embedded defaults, [`PromptTemplate`], [`EditorStyle`].
//! - [`workflow`]: [`build_workflow`], [`ArticleWorkflow`], [`WorkflowConfig`], [`WorkflowError`].

pub mod agent;
pub mod error;
pub mod graph;
pub mod llm;
pub mod message;
pub mod prompts;
pub mod state;
pub mod tool_source;
pub mod workflow;

pub use agent::{tools_condition, AgentNode, ToolNode, ToolRouter, ToolsConditionResult};
pub use error::AgentError;
pub use graph::{
    generate_dot, generate_text, CompilationError, CompiledStateGraph, Next, Node,
    NodeMiddleware, RunConfig, StateGraph, StateUpdater, END, START,
};
pub use llm::{bind_tools, ChatOpenAI, LlmClient, LlmResponse, MockLlm};
pub use message::Message;
pub use prompts::{EditorStyle, PromptSet, PromptTemplate};
pub use state::{ArticleState, ArticleStateUpdater, ImageResult, ToolCall, ToolResult};
pub use tool_source::{
    DallEImageGenerator, ImageToolSource, MockToolSource, TavilySearch, ToolSource, ToolSpec,
    WebSearchToolSource,
};
pub use workflow::{
    build_workflow, ArticleWorkflow, Capabilities, RetryPolicy, WorkflowConfig, WorkflowError,
    WorkflowOutput, WorkflowProgress,
};
