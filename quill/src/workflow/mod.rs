//! Article workflow: graph assembly, configuration and the retrying driver.
//!
//! [`build_workflow`] wires researcher, writer and editor with their tool loops;
//! [`ArticleWorkflow::main_workflow`] validates inputs, runs the graph with
//! attempt-level retry and an optional deadline, and extracts the article.

mod build;
mod config;
mod driver;
mod progress;
mod retry;

pub use build::{
    build_workflow, Capabilities, EDIT_NODE, IMAGE_GENERATION_NODE, RESEARCH_NODE,
    WEB_SEARCH_NODE, WRITE_NODE,
};
pub use config::{WorkflowConfig, DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY_MS};
pub use driver::{extract_article, ArticleWorkflow};
pub use progress::WorkflowProgress;
pub use retry::RetryPolicy;

use thiserror::Error;

use crate::error::AgentError;
use crate::graph::CompilationError;
use crate::prompts::LoadError;
use crate::state::ArticleState;
use crate::tool_source::ToolSourceError;

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowOutput {
    Article(String),
    FullState(ArticleState),
}

impl WorkflowOutput {
    /// The article text; for a full state, the same fallback as `Article`.
    pub fn article(&self) -> Option<String> {
        match self {
            Self::Article(text) => Some(text.clone()),
            Self::FullState(state) => extract_article(state).ok(),
        }
    }

    pub fn state(&self) -> Option<&ArticleState> {
        match self {
            Self::FullState(state) => Some(state),
            Self::Article(_) => None,
        }
    }
}

/// Failure of a `main_workflow` call.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Bad topic or word count; no capability was called.
    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid workflow config: {0}")]
    Config(String),

    #[error("prompts: {0}")]
    Prompt(#[from] LoadError),

    #[error("invalid prompt template for `{agent}`: {source}")]
    InvalidTemplate {
        agent: String,
        #[source]
        source: AgentError,
    },

    #[error("tool listing failed: {0}")]
    Tools(#[from] ToolSourceError),

    #[error("graph build failed: {0}")]
    Build(#[from] CompilationError),

    /// The per-call deadline passed; no artifact is returned.
    #[error("workflow timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("workflow failed after {attempts} attempts; last error: {last}")]
    RunExhausted {
        attempts: usize,
        #[source]
        last: AgentError,
    },

    /// The run finished without a single message to return.
    #[error("workflow produced no output")]
    EmptyResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_exhausted_message_names_attempts_and_cause() {
        let err = WorkflowError::RunExhausted {
            attempts: 2,
            last: AgentError::ExecutionFailed("model down".into()),
        };
        let s = err.to_string();
        assert!(s.starts_with("workflow failed after 2 attempts; last error: "), "{}", s);
        assert!(s.contains("model down"));
    }

    #[test]
    fn output_article_accessor() {
        assert_eq!(WorkflowOutput::Article("a".into()).article().as_deref(), Some("a"));
        let mut state = ArticleState::new("t", None);
        state.edited_article = Some("final".into());
        let out = WorkflowOutput::FullState(state);
        assert_eq!(out.article().as_deref(), Some("final"));
        assert!(out.state().is_some());
    }
}
