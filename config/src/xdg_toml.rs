//! Read `$XDG_CONFIG_HOME/<app>/config.toml`: the `[env]` table and typed sections.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::LoadError;

/// `$XDG_CONFIG_HOME` when set, else the platform config dir.
pub fn config_home() -> Result<PathBuf, LoadError> {
    if let Some(dir) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::config_dir().ok_or_else(|| LoadError::XdgPath("no config directory".into()))
}

/// Parsed `config.toml` for `app_name` under `base`; `None` when the file is absent.
fn read_table(base: &Path, app_name: &str) -> Result<Option<toml::Table>, LoadError> {
    let path = base.join(app_name).join("config.toml");
    if !path.is_file() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&path).map_err(LoadError::XdgRead)?;
    Ok(Some(toml::from_str(&content)?))
}

/// `[env]` key-value pairs. Missing file or section returns an empty map.
pub fn load_env_map(base: &Path, app_name: &str) -> Result<HashMap<String, String>, LoadError> {
    let Some(table) = read_table(base, app_name)? else {
        return Ok(HashMap::new());
    };
    match table.get("env") {
        Some(env) => Ok(env.clone().try_into()?),
        None => Ok(HashMap::new()),
    }
}

/// Deserializes the `[section]` table into `T`; `None` when file or section is absent.
pub fn load_section<T: DeserializeOwned>(
    base: &Path,
    app_name: &str,
    section: &str,
) -> Result<Option<T>, LoadError> {
    let Some(table) = read_table(base, app_name)? else {
        return Ok(None);
    };
    match table.get(section) {
        Some(value) => Ok(Some(value.clone().try_into()?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, app: &str, body: &str) {
        let app_dir = dir.join(app);
        std::fs::create_dir_all(&app_dir).unwrap();
        std::fs::write(app_dir.join("config.toml"), body).unwrap();
    }

    #[test]
    fn missing_config_returns_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_env_map(dir.path(), "quill").unwrap().is_empty());
    }

    #[test]
    fn load_env_map_reads_env_table() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "quill", "[env]\nFOO = \"from_toml\"\nBAR = \"baz\"\n");
        let map = load_env_map(dir.path(), "quill").unwrap();
        assert_eq!(map["FOO"], "from_toml");
        assert_eq!(map["BAR"], "baz");
    }

    #[test]
    fn config_without_env_section_returns_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "quill", "[other]\nkey = \"ignored\"\n");
        assert!(load_env_map(dir.path(), "quill").unwrap().is_empty());
    }

    #[test]
    fn invalid_toml_returns_xdg_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "quill", "not valid toml [[[\n");
        assert!(matches!(
            load_env_map(dir.path(), "quill"),
            Err(LoadError::XdgParse(_))
        ));
    }

    #[derive(serde::Deserialize, Debug, PartialEq)]
    struct Section {
        retries: u32,
    }

    #[test]
    fn load_section_reads_typed_table() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "quill", "[workflow]\nretries = 2\n");
        let s: Option<Section> = load_section(dir.path(), "quill", "workflow").unwrap();
        assert_eq!(s, Some(Section { retries: 2 }));
        let none: Option<Section> = load_section(dir.path(), "quill", "missing").unwrap();
        assert!(none.is_none());
    }
}
