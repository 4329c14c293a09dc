//! Load agent prompts from a directory of YAML files.
//!
//! Default prompt text lives in `quill/prompts/*.yaml`; it is embedded at
//! compile time and used for every file or field the directory does not
//! provide. See [`load`], [`load_or_default`], [`default_from_embedded`].

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::{EditorPrompts, PromptSet};

macro_rules! embed_prompt_yaml {
    ($name:literal) => {
        include_str!(concat!("../../prompts/", $name))
    };
}
const EMBED_RESEARCHER: &str = embed_prompt_yaml!("researcher.yaml");
const EMBED_WRITER: &str = embed_prompt_yaml!("writer.yaml");
const EMBED_EDITOR: &str = embed_prompt_yaml!("editor.yaml");

const RESEARCHER_FILE: &str = "researcher.yaml";
const WRITER_FILE: &str = "writer.yaml";
const EDITOR_FILE: &str = "editor.yaml";

/// Env var naming the prompts directory when none is passed.
pub const PROMPTS_DIR_ENV: &str = "QUILL_PROMPTS_DIR";
const DEFAULT_PROMPTS_DIR: &str = "prompts";

/// Error when loading prompts from a directory (missing dir, unreadable file, invalid YAML).
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("prompts directory not found or not readable: {0}")]
    DirNotFound(String),
    #[error("failed to read prompts file {path}: {message}")]
    ReadFile { path: String, message: String },
    #[error("failed to parse YAML in {path}: {message}")]
    ParseYaml { path: String, message: String },
}

#[derive(Debug, Default, Deserialize)]
struct AgentPromptFile {
    template: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct EditorPromptFile {
    general: Option<String>,
    emotional: Option<String>,
    hilarious: Option<String>,
    critical: Option<String>,
    image_instruction: Option<String>,
}

/// `dir` if given, else `QUILL_PROMPTS_DIR`, else `./prompts`.
fn prompts_dir(dir: Option<&Path>) -> PathBuf {
    dir.map(PathBuf::from).unwrap_or_else(|| {
        std::env::var_os(PROMPTS_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROMPTS_DIR))
    })
}

/// Reads and parses `dir/name`. A missing file is `Ok(None)`.
fn read_yaml_file<T>(dir: &Path, name: &str) -> Result<Option<T>, LoadError>
where
    T: for<'de> Deserialize<'de>,
{
    let path = dir.join(name);
    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(LoadError::ReadFile {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        }
    };
    serde_yaml::from_str(&content)
        .map(Some)
        .map_err(|e| LoadError::ParseYaml {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

fn overlay(target: &mut String, value: Option<String>) {
    if let Some(v) = value {
        *target = v;
    }
}

fn apply_agent(target: &mut String, file: Option<AgentPromptFile>) {
    overlay(target, file.and_then(|f| f.template));
}

fn apply_editor(target: &mut EditorPrompts, file: Option<EditorPromptFile>) {
    let Some(f) = file else { return };
    overlay(&mut target.general, f.general);
    overlay(&mut target.emotional, f.emotional);
    overlay(&mut target.hilarious, f.hilarious);
    overlay(&mut target.critical, f.critical);
    overlay(&mut target.image_instruction, f.image_instruction);
}

/// Loads `researcher.yaml`, `writer.yaml` and `editor.yaml` from the prompts directory.
///
/// Files and fields that are absent keep the embedded defaults. Errors when the
/// directory does not exist or a present file fails to read or parse.
pub fn load(dir: Option<&Path>) -> Result<PromptSet, LoadError> {
    let base = prompts_dir(dir);
    if !base.is_dir() {
        return Err(LoadError::DirNotFound(base.display().to_string()));
    }
    let mut set = default_from_embedded();
    apply_agent(&mut set.researcher, read_yaml_file(&base, RESEARCHER_FILE)?);
    apply_agent(&mut set.writer, read_yaml_file(&base, WRITER_FILE)?);
    apply_editor(&mut set.editor, read_yaml_file(&base, EDITOR_FILE)?);
    Ok(set)
}

/// Prompts parsed from the embedded `quill/prompts/*.yaml`.
pub fn default_from_embedded() -> PromptSet {
    let mut set = PromptSet::default();
    apply_agent(&mut set.researcher, serde_yaml::from_str(EMBED_RESEARCHER).ok());
    apply_agent(&mut set.writer, serde_yaml::from_str(EMBED_WRITER).ok());
    apply_editor(&mut set.editor, serde_yaml::from_str(EMBED_EDITOR).ok());
    set
}

/// Loads from the prompts directory when it exists, otherwise the embedded defaults.
/// A present but invalid file is still an error.
pub fn load_or_default(dir: Option<&Path>) -> Result<PromptSet, LoadError> {
    match load(dir) {
        Err(LoadError::DirNotFound(_)) => Ok(default_from_embedded()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::EditorStyle;

    #[test]
    fn embedded_defaults_are_complete() {
        let p = default_from_embedded();
        assert!(p.researcher.contains("{topic}"));
        assert!(p.writer.contains("{research_summary}"));
        assert!(p.writer.contains("{word_count}"));
        for style in EditorStyle::ALL {
            assert!(p.editor.template(style).contains("{article_draft}"), "{:?}", style);
        }
        assert!(p.editor.image_instruction.contains("generate_article_image"));
    }

    #[test]
    fn load_nonexistent_dir_returns_error() {
        let result = load(Some(Path::new("/nonexistent_prompts_dir_12345")));
        assert!(matches!(result, Err(LoadError::DirNotFound(_))));
    }

    #[test]
    fn load_or_default_falls_back_to_embedded() {
        let p = load_or_default(Some(Path::new("/nonexistent_prompts_dir_12345"))).unwrap();
        assert_eq!(p, default_from_embedded());
    }

    /// **Scenario**: a directory overriding only the hilarious editor keeps every other default.
    #[test]
    fn partial_override_keeps_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("editor.yaml"),
            "hilarious: \"Be funny about {topic}: {article_draft}\"\n",
        )
        .unwrap();
        let p = load(Some(temp.path())).unwrap();
        let defaults = default_from_embedded();
        assert_eq!(
            p.editor.template(EditorStyle::Hilarious),
            "Be funny about {topic}: {article_draft}"
        );
        assert_eq!(p.editor.general, defaults.editor.general);
        assert_eq!(p.researcher, defaults.researcher);
    }

    #[test]
    fn load_invalid_yaml_returns_parse_error() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("writer.yaml"), "template: [not closed").unwrap();
        assert!(matches!(
            load(Some(temp.path())),
            Err(LoadError::ParseYaml { .. })
        ));
        assert!(load_or_default(Some(temp.path())).is_err());
    }
}
