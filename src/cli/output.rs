use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use crate::model::task::{Task, TaskId};
use crate::ops::category_tree::{RenderItem, RenderLine};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson<'a> {
    pub id: TaskId,
    #[serde(flatten)]
    pub task: &'a Task,
}

#[derive(Serialize)]
pub struct CategoryLineJson<'a> {
    pub depth: usize,
    #[serde(flatten)]
    pub item: CategoryItemJson<'a>,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CategoryItemJson<'a> {
    Node { name: &'a str },
    Task {
        id: TaskId,
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<&'a str>,
        live: bool,
    },
}

pub fn tasks_to_json<'a>(tasks: &[(TaskId, &'a Task)]) -> Vec<TaskJson<'a>> {
    tasks
        .iter()
        .map(|&(id, task)| TaskJson { id, task })
        .collect()
}

/// Convert a category walk to JSON rows. `lookup` resolves a task id to its
/// title and whether it is still live.
pub fn category_to_json<'a>(
    lines: impl Iterator<Item = RenderLine<'a>>,
    lookup: impl Fn(TaskId) -> (Option<&'a str>, bool),
) -> Vec<CategoryLineJson<'a>> {
    lines
        .map(|line| {
            let item = match line.item {
                RenderItem::Node(name) => CategoryItemJson::Node { name },
                RenderItem::Task(id) => {
                    let (title, live) = lookup(id);
                    CategoryItemJson::Task { id, title, live }
                }
            };
            CategoryLineJson {
                depth: line.depth,
                item,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Text output
// ---------------------------------------------------------------------------

/// Pad `s` with spaces to `width` terminal columns
fn pad(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    format!("{}{}", s, " ".repeat(width.saturating_sub(w)))
}

/// Aligned table of tasks: priority, due date, title, category path, description
pub fn task_table(tasks: &[(TaskId, &Task)], date_format: &str) -> Vec<String> {
    let title_width = tasks
        .iter()
        .map(|(_, t)| UnicodeWidthStr::width(t.title.as_str()))
        .max()
        .unwrap_or(0);
    let path_width = tasks
        .iter()
        .map(|(_, t)| {
            UnicodeWidthStr::width(t.category.as_str())
                + 1
                + UnicodeWidthStr::width(t.subcategory.as_str())
        })
        .max()
        .unwrap_or(0);

    tasks
        .iter()
        .map(|(_, t)| {
            let path = format!("{}/{}", t.category, t.subcategory);
            let line = format!(
                "P{}  {}  {}  {}  {}",
                t.priority,
                t.due_date.format(date_format),
                pad(&t.title, title_width),
                pad(&path, path_width),
                t.description
            );
            line.trim_end().to_string()
        })
        .collect()
}
