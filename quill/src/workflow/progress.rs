//! Progress events and the node middleware that emits them.

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

use crate::error::AgentError;
use crate::graph::{Next, NodeCall, NodeMiddleware};
use crate::state::ArticleState;

/// Progress of one `main_workflow_with_progress` call, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowProgress {
    /// Inputs validated; the graph is being built.
    Initializing,
    AttemptStarted { attempt: usize, of: usize },
    NodeStarted { node: String },
    NodeFinished { node: String },
    AttemptFailed { attempt: usize, error: String },
    Completed,
}

/// Sends progress to an optional channel. A dropped receiver is ignored.
#[derive(Debug, Clone, Default)]
pub(crate) struct ProgressSink(Option<UnboundedSender<WorkflowProgress>>);

impl ProgressSink {
    pub(crate) fn new(tx: Option<UnboundedSender<WorkflowProgress>>) -> Self {
        Self(tx)
    }

    pub(crate) fn is_active(&self) -> bool {
        self.0.is_some()
    }

    pub(crate) fn emit(&self, event: WorkflowProgress) {
        if let Some(tx) = &self.0 {
            let _ = tx.send(event);
        }
    }
}

/// Logs node enter/exit (when enabled) and reports node progress.
pub(crate) struct WorkflowMiddleware {
    log_nodes: bool,
    progress: ProgressSink,
}

impl WorkflowMiddleware {
    pub(crate) fn new(log_nodes: bool, progress: ProgressSink) -> Self {
        Self {
            log_nodes,
            progress,
        }
    }
}

#[async_trait]
impl NodeMiddleware<ArticleState> for WorkflowMiddleware {
    async fn around_run(
        &self,
        node_id: &str,
        state: ArticleState,
        inner: NodeCall<ArticleState>,
    ) -> Result<(ArticleState, Next), AgentError> {
        if self.log_nodes {
            info!(node = %node_id, messages = state.messages.len(), "node enter");
        }
        self.progress.emit(WorkflowProgress::NodeStarted {
            node: node_id.to_string(),
        });
        let result = inner(state).await;
        match &result {
            Ok((update, next)) => {
                if self.log_nodes {
                    info!(node = %node_id, appended = update.messages.len(), next = ?next, "node exit");
                }
                self.progress.emit(WorkflowProgress::NodeFinished {
                    node: node_id.to_string(),
                });
            }
            Err(e) => {
                if self.log_nodes {
                    info!(node = %node_id, error = %e, "node exit with error");
                }
            }
        }
        result
    }
}
