//! JSON-file persistence for the task collection.
//!
//! One flat JSON array holds every task; every save rewrites the whole
//! document. There is no atomic-rename step and no partial write handling:
//! the file is small, single-user, and accessed by exactly one process.

use crate::task::Task;
use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File consulted when neither config nor flags name one.
pub const DEFAULT_STORE_FILE: &str = "todo.json";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed task file {path}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone)]
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full collection.
    ///
    /// A missing file is an empty list, and so is a malformed one: the
    /// collection degrades to empty rather than failing the caller. Use
    /// [`TaskStore::try_load`] to tell the two apart.
    pub fn load(&self) -> Result<Vec<Task>> {
        match self.try_load() {
            Ok(tasks) => Ok(tasks),
            Err(LoadError::Malformed { .. }) => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    /// Like [`TaskStore::load`], but reports a malformed file instead of
    /// swallowing it, so interactive surfaces can warn before the next save
    /// discards the old content.
    pub fn try_load(&self) -> Result<Vec<Task>, LoadError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(LoadError::Io {
                    path: self.path.clone(),
                    source: err,
                })
            }
        };

        serde_json::from_str(&raw).map_err(|err| LoadError::Malformed {
            path: self.path.clone(),
            source: err,
        })
    }

    /// Serialize every task and overwrite the document.
    pub fn save(&self, tasks: &[Task]) -> Result<()> {
        let json = serde_json::to_string_pretty(tasks).context("serialize tasks")?;
        fs::write(&self.path, json).with_context(|| format!("write {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Priority, Task};
    use chrono::NaiveDate;

    fn store_in(dir: &tempfile::TempDir) -> TaskStore {
        TaskStore::new(dir.path().join("todo.json"))
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.load().unwrap().is_empty());
        assert!(store.try_load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let mut tasks = vec![
            Task::new("dated")
                .with_priority(Priority::High)
                .with_due_date(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap())
                .with_category("Work"),
            Task::new("undated"),
        ];
        tasks[1].done = true;

        store.save(&tasks).unwrap();
        assert_eq!(store.load().unwrap(), tasks);

        // empty collection round-trips too
        store.save(&[]).unwrap();
        assert_eq!(store.load().unwrap(), Vec::new());
    }

    #[test]
    fn saving_twice_is_stable_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let tasks = vec![Task::new("a"), Task::new("b")];
        store.save(&tasks).unwrap();
        let first = fs::read_to_string(store.path()).unwrap();

        store.save(&store.load().unwrap()).unwrap();
        let second = fs::read_to_string(store.path()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn absent_due_date_never_written() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save(&[Task::new("no due")]).unwrap();
        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(!raw.contains("due_date"));

        let loaded = store.load().unwrap();
        assert_eq!(loaded[0].due_date, None);
    }

    #[test]
    fn invalid_json_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "not json {").unwrap();

        assert!(store.load().unwrap().is_empty());
        assert!(matches!(
            store.try_load(),
            Err(LoadError::Malformed { .. })
        ));
    }

    #[test]
    fn missing_required_field_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        // second object lacks "done": the whole collection is discarded
        fs::write(
            store.path(),
            r#"[
                {"task": "ok", "done": false, "priority": "Medium",
                 "created_at": "2024-01-01T00:00:00Z"},
                {"task": "broken", "priority": "Medium",
                 "created_at": "2024-01-01T00:00:00Z"}
            ]"#,
        )
        .unwrap();

        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn unknown_priority_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(
            store.path(),
            r#"[{"task": "x", "done": false, "priority": "Critical",
                 "created_at": "2024-01-01T00:00:00Z"}]"#,
        )
        .unwrap();

        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn missing_category_defaults_instead_of_degrading() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(
            store.path(),
            r#"[{"task": "x", "done": false, "priority": "Low",
                 "created_at": "2024-01-01T00:00:00Z"}]"#,
        )
        .unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].category, "General");
    }

    #[test]
    fn unreadable_file_is_an_error_not_empty() {
        let dir = tempfile::tempdir().unwrap();
        // the path is a directory: read fails with something other than NotFound
        let store = TaskStore::new(dir.path());
        assert!(store.load().is_err());
    }
}
