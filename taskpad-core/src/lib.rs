//! taskpad-core: task model, JSON-file store, and display logic for taskpad.

pub mod store;
pub mod task;
pub mod view;

pub use store::{LoadError, TaskStore, DEFAULT_STORE_FILE};
pub use task::{clear_completed, Priority, Task, TaskStatus, DEFAULT_CATEGORY};
pub use view::{completed_view, counts, pending_view, Counts, SortOption};
