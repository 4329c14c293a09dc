//! Workflow driver: validation, attempt-level retry, timeout and artifact extraction.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use crate::error::AgentError;
use crate::graph::{CompiledStateGraph, NodeMiddleware, RunConfig};
use crate::prompts::PromptSet;
use crate::state::ArticleState;

use super::build::build_with_middleware;
use super::progress::{ProgressSink, WorkflowMiddleware};
use super::{Capabilities, RetryPolicy, WorkflowConfig, WorkflowError, WorkflowOutput, WorkflowProgress};

/// Runs the article pipeline end to end.
///
/// Holds the capabilities and prompts; each call builds the graph for its
/// config, then runs it up to `retry_attempts` times, every attempt from a
/// fresh initial state.
#[derive(Clone)]
pub struct ArticleWorkflow {
    capabilities: Capabilities,
    prompts: PromptSet,
    retry_policy: Option<RetryPolicy>,
}

/// Trimmed topic must be non-empty; word count, when given, positive.
fn validate_inputs(topic: &str, word_count: Option<i64>) -> Result<Option<u32>, WorkflowError> {
    if topic.trim().is_empty() {
        return Err(WorkflowError::Validation("topic must not be empty".into()));
    }
    match word_count {
        None => Ok(None),
        Some(n) if n <= 0 => Err(WorkflowError::Validation(format!(
            "word_count must be positive, got {}",
            n
        ))),
        Some(n) => u32::try_from(n)
            .map(Some)
            .map_err(|_| WorkflowError::Validation(format!("word_count too large: {}", n))),
    }
}

/// `edited_article`, else the last AI message, else the last message.
pub fn extract_article(state: &ArticleState) -> Result<String, WorkflowError> {
    state
        .edited_article
        .clone()
        .or_else(|| state.last_ai_content().map(str::to_string))
        .or_else(|| state.last_message().map(|m| m.content().to_string()))
        .ok_or(WorkflowError::EmptyResult)
}

impl ArticleWorkflow {
    pub fn new(capabilities: Capabilities, prompts: PromptSet) -> Self {
        Self {
            capabilities,
            prompts,
            retry_policy: None,
        }
    }

    /// Overrides the fixed policy derived from `WorkflowConfig`.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// The compiled graph for `config`, without running it.
    pub async fn graph(
        &self,
        config: &WorkflowConfig,
    ) -> Result<CompiledStateGraph<ArticleState>, WorkflowError> {
        self.build(config, ProgressSink::default()).await
    }

    async fn build(
        &self,
        config: &WorkflowConfig,
        progress: ProgressSink,
    ) -> Result<CompiledStateGraph<ArticleState>, WorkflowError> {
        let middleware: Option<Arc<dyn NodeMiddleware<ArticleState>>> =
            if config.enable_logging || progress.is_active() {
                Some(Arc::new(WorkflowMiddleware::new(config.enable_logging, progress)))
            } else {
                None
            };
        build_with_middleware(&self.capabilities, &self.prompts, config, middleware).await
    }

    /// Runs the pipeline for `topic`.
    ///
    /// Returns the article text, or the whole final state when
    /// `return_full_state` is set. Validation errors fail before any capability
    /// is touched; a timeout ends the call without further attempts.
    pub async fn main_workflow(
        &self,
        topic: &str,
        word_count: Option<i64>,
        config: &WorkflowConfig,
        return_full_state: bool,
    ) -> Result<WorkflowOutput, WorkflowError> {
        self.run(topic, word_count, config, return_full_state, ProgressSink::default())
            .await
    }

    /// [`main_workflow`](Self::main_workflow) that also reports [`WorkflowProgress`].
    pub async fn main_workflow_with_progress(
        &self,
        topic: &str,
        word_count: Option<i64>,
        config: &WorkflowConfig,
        return_full_state: bool,
        progress: UnboundedSender<WorkflowProgress>,
    ) -> Result<WorkflowOutput, WorkflowError> {
        self.run(
            topic,
            word_count,
            config,
            return_full_state,
            ProgressSink::new(Some(progress)),
        )
        .await
    }

    async fn run(
        &self,
        topic: &str,
        word_count: Option<i64>,
        config: &WorkflowConfig,
        return_full_state: bool,
        progress: ProgressSink,
    ) -> Result<WorkflowOutput, WorkflowError> {
        let word_count = validate_inputs(topic, word_count)?;
        let topic = topic.trim();
        config.validate()?;
        // A timeout too large to represent as an instant means no deadline.
        let deadline = config.timeout().and_then(|t| Instant::now().checked_add(t));
        progress.emit(WorkflowProgress::Initializing);

        let graph = self.build(config, progress.clone()).await?;
        let policy = self
            .retry_policy
            .clone()
            .unwrap_or_else(|| config.retry_policy());
        let attempts = policy.max_attempts();

        let mut attempt = 0;
        loop {
            attempt += 1;
            progress.emit(WorkflowProgress::AttemptStarted {
                attempt,
                of: attempts,
            });
            let run_id = uuid::Uuid::new_v4().to_string();
            info!(run_id = %run_id, attempt, of = attempts, topic = %topic, "workflow attempt");

            let mut run_config = RunConfig::default().with_run_id(run_id);
            if let Some(d) = deadline {
                run_config = run_config.with_deadline(d);
            }
            let initial = ArticleState::new(topic, word_count);

            match graph.invoke(initial, Some(run_config)).await {
                Ok(state) => {
                    progress.emit(WorkflowProgress::Completed);
                    info!(attempt, images = state.image_count(), "workflow completed");
                    return if return_full_state {
                        Ok(WorkflowOutput::FullState(state))
                    } else {
                        extract_article(&state).map(WorkflowOutput::Article)
                    };
                }
                Err(AgentError::DeadlineExceeded { node }) => {
                    let seconds = config.timeout_seconds.unwrap_or_default();
                    warn!(attempt, node = %node, seconds, "workflow timed out");
                    progress.emit(WorkflowProgress::AttemptFailed {
                        attempt,
                        error: format!("timed out before node `{}`", node),
                    });
                    return Err(WorkflowError::Timeout { seconds });
                }
                Err(e) => {
                    warn!(attempt, of = attempts, error = %e, "workflow attempt failed");
                    progress.emit(WorkflowProgress::AttemptFailed {
                        attempt,
                        error: e.to_string(),
                    });
                    if !policy.should_retry(attempt) {
                        return Err(WorkflowError::RunExhausted {
                            attempts: attempt,
                            last: e,
                        });
                    }
                    let delay = policy.delay(attempt);
                    if let Some(d) = deadline {
                        let wake = Instant::now().checked_add(delay);
                        if wake.map_or(true, |w| w >= d) {
                            let seconds = config.timeout_seconds.unwrap_or_default();
                            warn!(attempt, seconds, "retry delay would pass the deadline");
                            return Err(WorkflowError::Timeout { seconds });
                        }
                    }
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
