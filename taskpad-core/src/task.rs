//! Task model and display-status derivation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category assigned when the user leaves the field blank.
pub const DEFAULT_CATEGORY: &str = "General";

/// Rank order is the declaration order: High sorts before Medium before Low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Next value in High -> Medium -> Low -> High rotation (form widgets).
    pub fn next(self) -> Self {
        match self {
            Priority::High => Priority::Medium,
            Priority::Medium => Priority::Low,
            Priority::Low => Priority::High,
        }
    }

    pub fn prev(self) -> Self {
        self.next().next()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        };
        f.write_str(s)
    }
}

impl FromStr for Priority {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(anyhow::anyhow!(
                "unknown priority '{other}' (expected high, medium or low)"
            )),
        }
    }
}

/// Display status, derived per render. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Completed,
    Overdue,
    Pending,
}

/// One to-do item.
///
/// The serialized shape matches the on-disk JSON contract: the description
/// lives under the `task` key, `due_date` is a plain `YYYY-MM-DD` string and
/// is omitted entirely when unset, `created_at` is an ISO-8601 timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "task")]
    pub description: String,

    pub done: bool,

    pub priority: Priority,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    #[serde(default = "default_category")]
    pub category: String,

    /// Set once at creation; edits never rewrite it.
    #[serde(with = "iso_timestamp")]
    pub created_at: DateTime<Utc>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl Task {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            done: false,
            priority: Priority::Medium,
            due_date: None,
            category: DEFAULT_CATEGORY.to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_due_date(mut self, due: NaiveDate) -> Self {
        self.due_date = Some(due);
        self
    }

    /// Blank input keeps the default category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        if !category.trim().is_empty() {
            self.category = category;
        }
        self
    }

    /// Overwrite the editable fields in place. `done` and `created_at` are
    /// left untouched.
    pub fn apply_edit(
        &mut self,
        description: impl Into<String>,
        priority: Priority,
        due_date: Option<NaiveDate>,
        category: impl Into<String>,
    ) {
        self.description = description.into();
        self.priority = priority;
        self.due_date = due_date;
        let category = category.into();
        self.category = if category.trim().is_empty() {
            DEFAULT_CATEGORY.to_string()
        } else {
            category
        };
    }

    pub fn status_on(&self, today: NaiveDate) -> TaskStatus {
        if self.done {
            return TaskStatus::Completed;
        }
        match self.due_date {
            Some(due) if due < today => TaskStatus::Overdue,
            _ => TaskStatus::Pending,
        }
    }
}

/// Drop every completed task, keeping the rest in stored order.
pub fn clear_completed(tasks: &mut Vec<Task>) {
    tasks.retain(|t| !t.done);
}

/// ISO-8601 (de)serialization for `created_at`.
///
/// Writes RFC 3339. Reads RFC 3339 as well as the zone-less form older data
/// files carry (`2024-01-01T12:34:56.789012`), which is taken as UTC.
mod iso_timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&dt.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|ndt| ndt.and_utc())
            .map_err(|e| serde::de::Error::custom(format!("invalid created_at '{raw}': {e}")))
    }
}
