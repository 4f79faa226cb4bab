use anyhow::{bail, Result};
use chrono::{Local, NaiveDate};
use clap::Subcommand;
use taskpad_core::{
    clear_completed, completed_view, counts, pending_view, Priority, SortOption, Task, TaskStatus,
    TaskStore,
};

use crate::config::Config;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Append a new task and save immediately
    Add {
        description: String,

        #[arg(long, default_value_t = Priority::Medium)]
        priority: Priority,

        /// Due date (YYYY-MM-DD); must not be in the past
        #[arg(long)]
        due: Option<NaiveDate>,

        /// Defaults to "General" when omitted or blank
        #[arg(long)]
        category: Option<String>,
    },

    /// Print pending tasks (sorted) followed by completed tasks
    List {
        /// Sort pending tasks by priority, due-date or category
        #[arg(long)]
        sort: Option<SortOption>,

        #[arg(long, default_value_t = false)]
        hide_completed: bool,
    },

    /// Mark the task at a position as done
    Done { position: usize },

    /// Mark the task at a position as not done again
    Undo { position: usize },

    /// Remove the task at a position
    Delete { position: usize },

    /// Overwrite fields of the task at a position
    Edit {
        position: usize,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        priority: Option<Priority>,

        #[arg(long)]
        due: Option<NaiveDate>,

        /// Remove the due date instead of setting one
        #[arg(long, default_value_t = false, conflicts_with = "due")]
        clear_due: bool,

        #[arg(long)]
        category: Option<String>,
    },

    /// Remove every completed task
    ClearCompleted,

    /// Show task counts
    Stats,
}

pub fn run(cmd: Command, store: &TaskStore, cfg: &Config) -> Result<()> {
    match cmd {
        Command::Add {
            description,
            priority,
            due,
            category,
        } => add(store, description, priority, due, category),
        Command::List {
            sort,
            hide_completed,
        } => list(
            store,
            sort.unwrap_or(cfg.ui.sort),
            !hide_completed && cfg.ui.show_completed,
        ),
        Command::Done { position } => set_done(store, position, true),
        Command::Undo { position } => set_done(store, position, false),
        Command::Delete { position } => delete(store, position),
        Command::Edit {
            position,
            description,
            priority,
            due,
            clear_due,
            category,
        } => edit(store, position, description, priority, due, clear_due, category),
        Command::ClearCompleted => run_clear_completed(store),
        Command::Stats => stats(store),
    }
}

/// 1-based position as printed by `list`, into the stored collection.
fn resolve(tasks: &[Task], position: usize) -> Result<usize> {
    if position == 0 || position > tasks.len() {
        bail!("no task at position {position} ({} tasks on file)", tasks.len());
    }
    Ok(position - 1)
}

fn add(
    store: &TaskStore,
    description: String,
    priority: Priority,
    due: Option<NaiveDate>,
    category: Option<String>,
) -> Result<()> {
    let description = description.trim().to_string();
    if description.is_empty() {
        bail!("task description cannot be empty");
    }
    if let Some(due) = due {
        let today = Local::now().date_naive();
        if due < today {
            bail!("due date {due} is in the past");
        }
    }

    let mut tasks = store.load()?;
    let mut task = Task::new(description).with_priority(priority);
    if let Some(due) = due {
        task = task.with_due_date(due);
    }
    if let Some(category) = category {
        task = task.with_category(category);
    }
    tasks.push(task);
    store.save(&tasks)?;

    println!("Added task {} to {}", tasks.len(), store.path().display());
    Ok(())
}

fn list(store: &TaskStore, sort: SortOption, show_completed: bool) -> Result<()> {
    let tasks = store.load()?;
    if tasks.is_empty() {
        println!("No tasks in {}", store.path().display());
        return Ok(());
    }

    let today = Local::now().date_naive();

    let pending = pending_view(&tasks, sort);
    println!("Pending (sorted by {sort}):");
    if pending.is_empty() {
        println!("  (none)");
    }
    for (pos, task) in &pending {
        print_row(*pos, task, today);
    }

    if show_completed {
        let completed = completed_view(&tasks);
        if !completed.is_empty() {
            println!("\nCompleted:");
            for (pos, task) in &completed {
                print_row(*pos, task, today);
            }
        }
    }

    let c = counts(&tasks);
    println!("\n{} total, {} pending, {} completed", c.total, c.pending, c.completed);
    Ok(())
}

fn print_row(pos: usize, task: &Task, today: NaiveDate) {
    let mut line = format!(
        "{:>3}. {} {}  [{} {}]",
        pos + 1,
        status_icon(task.status_on(today)),
        task.description,
        priority_marker(task.priority),
        task.priority,
    );
    if let Some(due) = task.due_date {
        line.push_str(&format!(" (due {due})"));
    }
    line.push_str(&format!(" #{}", task.category));
    println!("{line}");
}

fn set_done(store: &TaskStore, position: usize, done: bool) -> Result<()> {
    let mut tasks = store.load()?;
    let idx = resolve(&tasks, position)?;
    tasks[idx].done = done;
    store.save(&tasks)?;

    let verb = if done { "Completed" } else { "Reopened" };
    println!("{verb} '{}'", tasks[idx].description);
    Ok(())
}

fn delete(store: &TaskStore, position: usize) -> Result<()> {
    let mut tasks = store.load()?;
    let idx = resolve(&tasks, position)?;
    let removed = tasks.remove(idx);
    store.save(&tasks)?;

    println!("Deleted '{}'", removed.description);
    Ok(())
}

fn edit(
    store: &TaskStore,
    position: usize,
    description: Option<String>,
    priority: Option<Priority>,
    due: Option<NaiveDate>,
    clear_due: bool,
    category: Option<String>,
) -> Result<()> {
    if description.is_none() && priority.is_none() && due.is_none() && !clear_due && category.is_none()
    {
        bail!("nothing to change (pass --description, --priority, --due, --clear-due or --category)");
    }
    if let Some(d) = &description {
        if d.trim().is_empty() {
            bail!("task description cannot be empty");
        }
    }

    let mut tasks = store.load()?;
    let idx = resolve(&tasks, position)?;

    let current = &tasks[idx];
    let new_description = description.unwrap_or_else(|| current.description.clone());
    let new_priority = priority.unwrap_or(current.priority);
    let new_due = if clear_due { None } else { due.or(current.due_date) };
    let new_category = category.unwrap_or_else(|| current.category.clone());

    tasks[idx].apply_edit(new_description, new_priority, new_due, new_category);
    store.save(&tasks)?;

    println!("Updated '{}'", tasks[idx].description);
    Ok(())
}

fn run_clear_completed(store: &TaskStore) -> Result<()> {
    let mut tasks = store.load()?;
    let before = tasks.len();
    clear_completed(&mut tasks);
    store.save(&tasks)?;

    println!("Removed {} completed task(s), {} left", before - tasks.len(), tasks.len());
    Ok(())
}

fn stats(store: &TaskStore) -> Result<()> {
    let c = counts(&store.load()?);
    println!("Total:     {}", c.total);
    println!("Pending:   {}", c.pending);
    println!("Completed: {}", c.completed);
    Ok(())
}

pub(crate) fn status_icon(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Completed => "✅",
        TaskStatus::Overdue => "⏰",
        TaskStatus::Pending => "📌",
    }
}

pub(crate) fn priority_marker(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "🔴",
        Priority::Medium => "🟠",
        Priority::Low => "🟢",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_rejects_out_of_range_positions() {
        let tasks = vec![Task::new("a"), Task::new("b")];
        assert!(resolve(&tasks, 0).is_err());
        assert!(resolve(&tasks, 3).is_err());
        assert_eq!(resolve(&tasks, 1).unwrap(), 0);
        assert_eq!(resolve(&tasks, 2).unwrap(), 1);
    }
}
