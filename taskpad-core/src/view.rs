//! Display ordering, filtering, and summary counts.
//!
//! Nothing here is persisted: sorting and the completed-tasks filter exist
//! only for one render. Rows keep their position in the stored collection
//! so mutations always address the task the user actually picked, no matter
//! how the list was sorted on screen.

use crate::task::Task;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOption {
    #[default]
    Priority,
    DueDate,
    Category,
}

impl SortOption {
    /// Rotation used by the interactive sort toggle.
    pub fn next(self) -> Self {
        match self {
            SortOption::Priority => SortOption::DueDate,
            SortOption::DueDate => SortOption::Category,
            SortOption::Category => SortOption::Priority,
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SortOption::Priority => "priority",
            SortOption::DueDate => "due-date",
            SortOption::Category => "category",
        };
        f.write_str(s)
    }
}

impl FromStr for SortOption {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "priority" => Ok(SortOption::Priority),
            "due-date" | "due_date" | "due" => Ok(SortOption::DueDate),
            "category" => Ok(SortOption::Category),
            other => Err(anyhow::anyhow!(
                "unknown sort option '{other}' (expected priority, due-date or category)"
            )),
        }
    }
}

/// Pending tasks as `(stored position, task)` rows, re-sorted for display.
///
/// The sort is stable, so ties keep insertion order. Tasks without a due
/// date sort after every dated task.
pub fn pending_view(tasks: &[Task], sort: SortOption) -> Vec<(usize, &Task)> {
    let mut rows: Vec<(usize, &Task)> = tasks.iter().enumerate().filter(|(_, t)| !t.done).collect();

    match sort {
        SortOption::Priority => rows.sort_by_key(|&(_, t)| t.priority),
        SortOption::DueDate => rows.sort_by_key(|&(_, t)| t.due_date.unwrap_or(NaiveDate::MAX)),
        SortOption::Category => rows.sort_by(|(_, a), (_, b)| a.category.cmp(&b.category)),
    }

    rows
}

/// Completed tasks in stored order. The sort option never applies here.
pub fn completed_view(tasks: &[Task]) -> Vec<(usize, &Task)> {
    tasks.iter().enumerate().filter(|(_, t)| t.done).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counts {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
}

pub fn counts(tasks: &[Task]) -> Counts {
    let completed = tasks.iter().filter(|t| t.done).count();
    Counts {
        total: tasks.len(),
        pending: tasks.len() - completed,
        completed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Priority;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn descriptions(rows: &[(usize, &Task)]) -> Vec<String> {
        rows.iter().map(|(_, t)| t.description.clone()).collect()
    }

    #[test]
    fn priority_sort_is_rank_order_not_alphabetic() {
        let tasks = vec![
            Task::new("low").with_priority(Priority::Low),
            Task::new("high").with_priority(Priority::High),
            Task::new("medium").with_priority(Priority::Medium),
        ];

        let rows = pending_view(&tasks, SortOption::Priority);
        assert_eq!(descriptions(&rows), vec!["high", "medium", "low"]);
    }

    #[test]
    fn undated_tasks_sort_after_all_dated_tasks() {
        let tasks = vec![
            Task::new("undated"),
            Task::new("dated").with_due_date(date(2030, 1, 1)),
        ];

        let rows = pending_view(&tasks, SortOption::DueDate);
        assert_eq!(descriptions(&rows), vec!["dated", "undated"]);
    }

    #[test]
    fn due_date_sort_is_ascending() {
        let tasks = vec![
            Task::new("later").with_due_date(date(2025, 6, 1)),
            Task::new("sooner").with_due_date(date(2025, 1, 1)),
        ];

        let rows = pending_view(&tasks, SortOption::DueDate);
        assert_eq!(descriptions(&rows), vec!["sooner", "later"]);
    }

    #[test]
    fn category_sort_is_lexicographic_and_stable() {
        let tasks = vec![
            Task::new("w1").with_category("Work"),
            Task::new("h1").with_category("Home"),
            Task::new("w2").with_category("Work"),
        ];

        let rows = pending_view(&tasks, SortOption::Category);
        assert_eq!(descriptions(&rows), vec!["h1", "w1", "w2"]);
    }

    #[test]
    fn rows_carry_stored_positions_through_the_sort() {
        let tasks = vec![
            Task::new("low").with_priority(Priority::Low),
            Task::new("high").with_priority(Priority::High),
        ];

        let rows = pending_view(&tasks, SortOption::Priority);
        // "high" is displayed first but still addresses stored slot 1
        assert_eq!(rows[0].0, 1);
        assert_eq!(rows[1].0, 0);
    }

    #[test]
    fn completed_tasks_are_excluded_from_pending_and_kept_in_stored_order() {
        let mut tasks = vec![
            Task::new("a").with_priority(Priority::Low),
            Task::new("b").with_priority(Priority::High),
            Task::new("c").with_priority(Priority::Medium),
        ];
        tasks[0].done = true;
        tasks[2].done = true;

        let pending = pending_view(&tasks, SortOption::Priority);
        assert_eq!(descriptions(&pending), vec!["b"]);

        // insertion order, untouched by any sort option
        let completed = completed_view(&tasks);
        assert_eq!(descriptions(&completed), vec!["a", "c"]);
        assert_eq!(completed[0].0, 0);
        assert_eq!(completed[1].0, 2);
    }

    #[test]
    fn counts_add_up() {
        let mut tasks = vec![Task::new("a"), Task::new("b"), Task::new("c")];
        tasks[1].done = true;

        let c = counts(&tasks);
        assert_eq!(c.total, 3);
        assert_eq!(c.pending, 2);
        assert_eq!(c.completed, 1);
    }

    #[test]
    fn sort_option_parsing_and_rotation() {
        assert_eq!("due-date".parse::<SortOption>().unwrap(), SortOption::DueDate);
        assert_eq!("PRIORITY".parse::<SortOption>().unwrap(), SortOption::Priority);
        assert!("random".parse::<SortOption>().is_err());

        assert_eq!(SortOption::Priority.next(), SortOption::DueDate);
        assert_eq!(SortOption::Category.next(), SortOption::Priority);
    }
}
