use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use taskpad_core::{SortOption, DEFAULT_STORE_FILE};

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub store: StoreSection,
    pub ui: UiSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// Task file, resolved relative to the working directory.
    pub file: PathBuf,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_STORE_FILE),
        }
    }
}

/// Initial values for the per-run view state. Runtime toggles are never
/// written back.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSection {
    pub show_completed: bool,
    pub sort: SortOption,
}

impl Default for UiSection {
    fn default() -> Self {
        Self {
            show_completed: true,
            sort: SortOption::Priority,
        }
    }
}

pub fn taskpad_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".taskpad"))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(taskpad_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).context("parse config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_yields_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.store.file, PathBuf::from(DEFAULT_STORE_FILE));
        assert!(cfg.ui.show_completed);
        assert_eq!(cfg.ui.sort, SortOption::Priority);
    }

    #[test]
    fn partial_config_overrides_only_named_keys() {
        let cfg: Config = toml::from_str(
            r#"
            [store]
            file = "work-tasks.json"

            [ui]
            sort = "due-date"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.store.file, PathBuf::from("work-tasks.json"));
        assert_eq!(cfg.ui.sort, SortOption::DueDate);
        assert!(cfg.ui.show_completed);
    }
}
