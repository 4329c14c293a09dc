//! Configuration for Quill: XDG `config.toml`, project `.env` and the process
//! environment, applied with priority **existing env > .env > XDG**.
//!
//! Provider credentials are then read once into [`ProviderSettings`] and passed
//! to the concrete capabilities explicitly; nothing downstream reads the
//! environment on its own.

mod dotenv;
mod provider;
mod xdg_toml;

use std::collections::HashMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use thiserror::Error;

pub use provider::{
    ProviderSettings, DEFAULT_IMAGE_MODEL, DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL,
};
pub use xdg_toml::config_home;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("xdg config path: {0}")]
    XdgPath(String),
    #[error("read xdg config: {0}")]
    XdgRead(std::io::Error),
    #[error("parse xdg toml: {0}")]
    XdgParse(#[from] toml::de::Error),
    #[error("read .env: {0}")]
    DotenvRead(std::io::Error),
}

/// Resolves the merged key-value map without touching the environment.
/// `.env` values shadow XDG values.
fn merged_map(
    app_name: &str,
    dotenv_dir: Option<&Path>,
    config_home: &Path,
) -> Result<HashMap<String, String>, LoadError> {
    let mut merged = xdg_toml::load_env_map(config_home, app_name)?;
    let dotenv_map = dotenv::load_env_map(dotenv_dir).map_err(LoadError::DotenvRead)?;
    merged.extend(dotenv_map);
    Ok(merged)
}

/// Sets every key from `map` that the process environment does not define yet.
fn apply_missing(map: HashMap<String, String>) {
    for (key, value) in map {
        if std::env::var_os(&key).is_none() {
            std::env::set_var(&key, value);
        }
    }
}

/// Loads `$XDG_CONFIG_HOME/<app_name>/config.toml` `[env]` and the project `.env`,
/// then sets only the variables not already present in the environment.
///
/// * `app_name`: e.g. `"quill"`, giving `~/.config/quill/config.toml`.
/// * `override_dir`: directory holding `.env`; defaults to the current directory.
pub fn load_and_apply(app_name: &str, override_dir: Option<&Path>) -> Result<(), LoadError> {
    let home = config_home()?;
    load_and_apply_in(app_name, override_dir, &home)
}

/// Same as [`load_and_apply`] with an explicit config home instead of `$XDG_CONFIG_HOME`.
pub fn load_and_apply_in(
    app_name: &str,
    override_dir: Option<&Path>,
    config_home: &Path,
) -> Result<(), LoadError> {
    apply_missing(merged_map(app_name, override_dir, config_home)?);
    Ok(())
}

/// Reads a typed `[section]` from the app's XDG `config.toml`, e.g. `[workflow]`.
pub fn load_section<T: DeserializeOwned>(
    app_name: &str,
    section: &str,
) -> Result<Option<T>, LoadError> {
    xdg_toml::load_section(&config_home()?, app_name, section)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn write_xdg(home: &Path, app: &str, body: &str) {
        let dir = home.join(app);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), body).unwrap();
    }

    #[test]
    fn existing_env_wins() {
        let home = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        write_xdg(home.path(), "quill", "[env]\nQUILL_CFG_TEST_EXISTING = \"xdg\"\n");
        std::fs::write(project.path().join(".env"), "QUILL_CFG_TEST_EXISTING=dotenv\n").unwrap();
        env::set_var("QUILL_CFG_TEST_EXISTING", "from_env");

        load_and_apply_in("quill", Some(project.path()), home.path()).unwrap();
        assert_eq!(env::var("QUILL_CFG_TEST_EXISTING").as_deref(), Ok("from_env"));
        env::remove_var("QUILL_CFG_TEST_EXISTING");
    }

    #[test]
    fn no_config_anywhere_is_ok() {
        let home = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        assert!(load_and_apply_in("quill", Some(project.path()), home.path()).is_ok());
    }

    #[test]
    fn dotenv_overrides_xdg() {
        let home = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        write_xdg(
            home.path(),
            "quill",
            "[env]\nQUILL_CFG_TEST_PRIO = \"xdg\"\nQUILL_CFG_TEST_XDG_ONLY = \"xdg\"\n",
        );
        std::fs::write(project.path().join(".env"), "QUILL_CFG_TEST_PRIO=dotenv\n").unwrap();

        let map = merged_map("quill", Some(project.path()), home.path()).unwrap();
        assert_eq!(map["QUILL_CFG_TEST_PRIO"], "dotenv");
        assert_eq!(map["QUILL_CFG_TEST_XDG_ONLY"], "xdg");
    }

    #[test]
    fn xdg_applied_when_no_dotenv() {
        let home = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        write_xdg(home.path(), "quill", "[env]\nQUILL_CFG_TEST_XDG_APPLIED = \"yes\"\n");

        load_and_apply_in("quill", Some(project.path()), home.path()).unwrap();
        assert_eq!(env::var("QUILL_CFG_TEST_XDG_APPLIED").as_deref(), Ok("yes"));
        env::remove_var("QUILL_CFG_TEST_XDG_APPLIED");
    }

    #[test]
    fn invalid_xdg_toml_fails_with_xdg_parse_error() {
        let home = tempfile::tempdir().unwrap();
        write_xdg(home.path(), "quill", "[env\nbroken");
        let project = tempfile::tempdir().unwrap();
        let result = load_and_apply_in("quill", Some(project.path()), home.path());
        assert!(matches!(result, Err(LoadError::XdgParse(_))));
    }
}
