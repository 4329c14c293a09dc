//! Workflow options, loadable from TOML.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::graph::DEFAULT_MAX_STEPS;
use crate::prompts::EditorStyle;

use super::{RetryPolicy, WorkflowError};

pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// Options for one `main_workflow` call.
///
/// ```toml
/// retry_attempts = 2
/// timeout_seconds = 300
/// editor_style = "Hilarious"
/// enable_image_generation = false
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkflowConfig {
    /// Log each node's enter/exit at info level.
    pub enable_logging: bool,
    /// Wall-clock budget for the whole call, retries included.
    pub timeout_seconds: Option<u64>,
    /// Total runs before giving up; at least 1.
    pub retry_attempts: u32,
    pub editor_style: EditorStyle,
    pub enable_image_generation: bool,
    /// Wait between attempts.
    pub retry_delay_ms: u64,
    /// Node executions allowed per run.
    pub max_steps: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            enable_logging: true,
            timeout_seconds: None,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            editor_style: EditorStyle::General,
            enable_image_generation: true,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl WorkflowConfig {
    /// Parses and validates a TOML document; missing keys take defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, WorkflowError> {
        let config: Self =
            toml::from_str(s).map_err(|e| WorkflowError::Config(format!("invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), WorkflowError> {
        if self.retry_attempts == 0 {
            return Err(WorkflowError::Config("retry_attempts must be at least 1".into()));
        }
        if self.max_steps == 0 {
            return Err(WorkflowError::Config("max_steps must be at least 1".into()));
        }
        if self.timeout_seconds == Some(0) {
            return Err(WorkflowError::Config("timeout_seconds must be positive".into()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    /// Fixed-interval policy from `retry_attempts` and `retry_delay_ms`.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(
            self.retry_attempts as usize,
            Duration::from_millis(self.retry_delay_ms),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = WorkflowConfig::default();
        assert!(c.enable_logging);
        assert_eq!(c.timeout_seconds, None);
        assert_eq!(c.retry_attempts, 3);
        assert_eq!(c.editor_style, EditorStyle::General);
        assert!(c.enable_image_generation);
        assert_eq!(c.retry_delay_ms, 1000);
        assert_eq!(c.max_steps, 25);
    }

    #[test]
    fn from_toml_overrides_some_keys() {
        let c = WorkflowConfig::from_toml_str(
            "retry_attempts = 2\ntimeout_seconds = 60\neditor_style = \"Critical\"\nenable_image_generation = false\n",
        )
        .unwrap();
        assert_eq!(c.retry_attempts, 2);
        assert_eq!(c.timeout(), Some(Duration::from_secs(60)));
        assert_eq!(c.editor_style, EditorStyle::Critical);
        assert!(!c.enable_image_generation);
        assert_eq!(c.max_steps, 25);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            WorkflowConfig::from_toml_str("retry_attempts = 0"),
            Err(WorkflowError::Config(_))
        ));
        assert!(WorkflowConfig::from_toml_str("max_steps = 0").is_err());
        assert!(WorkflowConfig::from_toml_str("editor_style = \"Sarcastic\"").is_err());
        assert!(WorkflowConfig::from_toml_str("unknown_key = 1").is_err());
    }

    #[test]
    fn retry_policy_uses_attempts_and_delay() {
        let c = WorkflowConfig {
            retry_attempts: 4,
            retry_delay_ms: 0,
            ..WorkflowConfig::default()
        };
        assert_eq!(c.retry_policy(), RetryPolicy::fixed(4, Duration::ZERO));
    }
}
