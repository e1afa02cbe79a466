use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format used when no display config overrides it
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Lowest (most important) priority
pub const PRIORITY_MIN: u8 = 1;
/// Highest (least important) priority
pub const PRIORITY_MAX: u8 = 5;

/// Stable identity of a task, assigned once when the task enters the store.
///
/// Titles can be changed by a modify, so anything that needs to find the same
/// task later (history entries, the category tree, the urgent queue) holds one
/// of these instead of the title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique among live tasks (exact, case-sensitive)
    pub title: String,
    pub description: String,
    /// 1 (most urgent) ..= 5
    pub priority: u8,
    pub due_date: NaiveDate,
    pub category: String,
    pub subcategory: String,
}

impl Task {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        priority: u8,
        due_date: NaiveDate,
        category: impl Into<String>,
        subcategory: impl Into<String>,
    ) -> Self {
        Task {
            title: title.into(),
            description: description.into(),
            priority,
            due_date,
            category: category.into(),
            subcategory: subcategory.into(),
        }
    }

    /// One-line summary with the due date in the given strftime format
    pub fn summary(&self, date_format: &str) -> String {
        format!(
            "{} | {} | priority {} | due {} | {}/{}",
            self.title,
            self.description,
            self.priority,
            self.due_date.format(date_format),
            self.category,
            self.subcategory
        )
    }

    /// Apply every field set in `edit`, leaving the rest untouched.
    pub fn apply(&mut self, edit: &TaskEdit) {
        if let Some(title) = &edit.title {
            self.title = title.clone();
        }
        if let Some(description) = &edit.description {
            self.description = description.clone();
        }
        if let Some(priority) = edit.priority {
            self.priority = priority;
        }
        if let Some(due_date) = edit.due_date {
            self.due_date = due_date;
        }
        if let Some(category) = &edit.category {
            self.category = category.clone();
        }
        if let Some(subcategory) = &edit.subcategory {
            self.subcategory = subcategory.clone();
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary(DEFAULT_DATE_FORMAT))
    }
}

/// A partial update to a task. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<u8>,
    pub due_date: Option<NaiveDate>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
}

impl TaskEdit {
    pub fn is_empty(&self) -> bool {
        *self == TaskEdit::default()
    }
}
