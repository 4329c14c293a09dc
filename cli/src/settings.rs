//! Resolves the `WorkflowConfig` for a run: `--config` file, else the XDG
//! `[workflow]` section, else defaults; command-line flags applied last.

use std::path::{Path, PathBuf};

use quill::prompts::EditorStyle;
use quill::WorkflowConfig;
use thiserror::Error;

pub const APP_NAME: &str = "quill";
const WORKFLOW_SECTION: &str = "workflow";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error(transparent)]
    Env(#[from] quill_config::LoadError),
}

/// Flags that override the resolved config; `None`/`false` leaves it alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub style: Option<EditorStyle>,
    pub no_images: bool,
    pub retries: Option<u32>,
    pub timeout_seconds: Option<u64>,
    pub max_steps: Option<usize>,
    pub quiet_nodes: bool,
}

impl Overrides {
    pub fn apply(&self, config: &mut WorkflowConfig) {
        if let Some(style) = self.style {
            config.editor_style = style;
        }
        if self.no_images {
            config.enable_image_generation = false;
        }
        if let Some(n) = self.retries {
            config.retry_attempts = n;
        }
        if let Some(t) = self.timeout_seconds {
            config.timeout_seconds = Some(t);
        }
        if let Some(n) = self.max_steps {
            config.max_steps = n;
        }
        if self.quiet_nodes {
            config.enable_logging = false;
        }
    }
}

/// Parses a TOML file holding `WorkflowConfig` keys at the top level.
pub fn read_config_file(path: &Path) -> Result<WorkflowConfig, SettingsError> {
    let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    WorkflowConfig::from_toml_str(&text).map_err(|e| SettingsError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Base config before overrides.
pub fn base_config(file: Option<&Path>) -> Result<WorkflowConfig, SettingsError> {
    match file {
        Some(path) => read_config_file(path),
        None => Ok(
            quill_config::load_section::<WorkflowConfig>(APP_NAME, WORKFLOW_SECTION)?
                .unwrap_or_default(),
        ),
    }
}

pub fn resolve(file: Option<&Path>, overrides: &Overrides) -> Result<WorkflowConfig, SettingsError> {
    let mut config = base_config(file)?;
    overrides.apply(&mut config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_file_then_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workflow.toml");
        std::fs::write(
            &path,
            "retry_attempts = 5\neditor_style = \"Critical\"\ntimeout_seconds = 90\n",
        )
        .unwrap();

        let config = resolve(Some(&path), &Overrides::default()).unwrap();
        assert_eq!(config.retry_attempts, 5);
        assert_eq!(config.editor_style, EditorStyle::Critical);
        assert_eq!(config.timeout_seconds, Some(90));

        let overrides = Overrides {
            style: Some(EditorStyle::Emotional),
            no_images: true,
            retries: Some(1),
            ..Overrides::default()
        };
        let config = resolve(Some(&path), &overrides).unwrap();
        assert_eq!(config.retry_attempts, 1);
        assert_eq!(config.editor_style, EditorStyle::Emotional);
        assert!(!config.enable_image_generation);
        assert_eq!(config.timeout_seconds, Some(90));
    }

    #[test]
    fn missing_or_bad_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            read_config_file(&missing),
            Err(SettingsError::Read { .. })
        ));

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "retry_atempts = 2\n").unwrap();
        assert!(matches!(read_config_file(&bad), Err(SettingsError::Parse { .. })));
    }
}
