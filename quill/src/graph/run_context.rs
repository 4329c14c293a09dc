//! Per-run configuration and the context handed to nodes.
//!
//! `RunConfig` is what callers pass to `CompiledStateGraph::invoke`: an optional
//! run id for log correlation, a step budget override and a wall-clock deadline.
//! `RunContext` is built from it by the engine and updated with the current step.

use std::time::{Duration, Instant};

/// Options for a single graph run.
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// Id used in log events; generated by the caller (e.g. the workflow driver).
    pub run_id: Option<String>,
    /// Overrides the graph's step budget for this run.
    pub max_steps: Option<usize>,
    /// Checked before each node; never interrupts a node mid-flight.
    pub deadline: Option<Instant>,
}

impl RunConfig {
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Deadline `timeout` from now; no deadline when that instant is not representable.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    pub fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// Context passed to `Node::run_with_context`.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    pub config: RunConfig,
    /// Zero-based index of the node execution within the run.
    pub step: usize,
}

impl RunContext {
    pub fn new(config: RunConfig) -> Self {
        Self { config, step: 0 }
    }

    pub fn run_id(&self) -> Option<&str> {
        self.config.run_id.as_deref()
    }
}
