use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::model::config::DEFAULT_HISTORY_LIMIT;
use crate::model::task::{Task, TaskId};
use crate::ops::task_store::TaskStore;

/// Error type for history operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryError {
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("nothing to redo")]
    NothingToRedo,
}

/// What a recorded action did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    /// The task was appended to the store
    Add,
    /// The task was taken out of the store
    Remove,
    /// The task's fields were edited in place
    Modify {
        before: Box<Task>,
        after: Box<Task>,
    },
}

/// Fieldless tag of an `ActionKind`, for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionTag {
    Add,
    Remove,
    Modify,
}

impl fmt::Display for ActionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ActionTag::Add => "add",
            ActionTag::Remove => "remove",
            ActionTag::Modify => "modify",
        })
    }
}

/// A single undoable action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryAction {
    pub task: TaskId,
    pub kind: ActionKind,
    /// Store index the task occupied when the action happened
    pub original_position: Option<usize>,
}

impl HistoryAction {
    pub fn add(task: TaskId, position: usize) -> Self {
        HistoryAction {
            task,
            kind: ActionKind::Add,
            original_position: Some(position),
        }
    }

    pub fn remove(task: TaskId, position: usize) -> Self {
        HistoryAction {
            task,
            kind: ActionKind::Remove,
            original_position: Some(position),
        }
    }

    pub fn modify(task: TaskId, before: Task, after: Task) -> Self {
        HistoryAction {
            task,
            kind: ActionKind::Modify {
                before: Box::new(before),
                after: Box::new(after),
            },
            original_position: None,
        }
    }

    pub fn tag(&self) -> ActionTag {
        match self.kind {
            ActionKind::Add => ActionTag::Add,
            ActionKind::Remove => ActionTag::Remove,
            ActionKind::Modify { .. } => ActionTag::Modify,
        }
    }
}

/// What undo/redo just replayed, for the caller to confirm to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionReport {
    pub kind: ActionTag,
    pub task: TaskId,
    /// The task's title after the replay
    pub title: String,
}

/// Linear undo/redo over store actions.
///
/// `done` and `undone` are both most-recent-last. Recording a new action
/// clears `undone`, so an undone action is unreachable once anything else
/// happens.
#[derive(Debug)]
pub struct History {
    done: Vec<HistoryAction>,
    undone: Vec<HistoryAction>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    /// A history that keeps at most `limit` undoable actions, dropping the
    /// oldest first.
    pub fn with_limit(limit: usize) -> Self {
        History {
            done: Vec::new(),
            undone: Vec::new(),
            limit,
        }
    }

    /// Push a new action. Clears the redo stack.
    pub fn record(&mut self, action: HistoryAction) {
        self.done.push(action);
        if self.done.len() > self.limit {
            self.done.drain(..self.done.len() - self.limit);
        }
        self.undone.clear();
    }

    /// Undo the last action, applying its inverse to `store`.
    pub fn undo(&mut self, store: &mut TaskStore) -> Result<ActionReport, HistoryError> {
        let action = self.done.pop().ok_or(HistoryError::NothingToUndo)?;
        apply_inverse(&action, store);
        let report = report_for(&action, store);
        debug!(kind = %report.kind, task = %report.task, "undo");
        self.undone.push(action);
        Ok(report)
    }

    /// Redo the last undone action, re-applying it to `store`.
    pub fn redo(&mut self, store: &mut TaskStore) -> Result<ActionReport, HistoryError> {
        let action = self.undone.pop().ok_or(HistoryError::NothingToRedo)?;
        apply_forward(&action, store);
        let report = report_for(&action, store);
        debug!(kind = %report.kind, task = %report.task, "redo");
        self.done.push(action);
        Ok(report)
    }

    pub fn can_undo(&self) -> bool {
        !self.done.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    /// The action the next undo would revert
    pub fn peek_undo(&self) -> Option<&HistoryAction> {
        self.done.last()
    }

    /// The action the next redo would re-apply
    pub fn peek_redo(&self) -> Option<&HistoryAction> {
        self.undone.last()
    }
}

fn report_for(action: &HistoryAction, store: &TaskStore) -> ActionReport {
    ActionReport {
        kind: action.tag(),
        task: action.task,
        title: store
            .get(action.task)
            .map(|t| t.title.clone())
            .unwrap_or_default(),
    }
}

/// Apply the inverse of an action (for undo). Returns false if the store no
/// longer holds the task the action refers to.
fn apply_inverse(action: &HistoryAction, store: &mut TaskStore) -> bool {
    let applied = match &action.kind {
        ActionKind::Add => store.remove_id(action.task).is_some(),
        ActionKind::Remove => {
            match action.original_position {
                Some(idx) => store.insert_at(action.task, idx),
                None => store.append(action.task),
            };
            true
        }
        ActionKind::Modify { before, .. } => store.replace(action.task, before.as_ref().clone()),
    };
    if !applied {
        debug!(kind = %action.tag(), task = %action.task, "undo found no task to revert");
    }
    applied
}

/// Re-apply an action (for redo). Returns false if the store no longer holds
/// the task the action refers to.
fn apply_forward(action: &HistoryAction, store: &mut TaskStore) -> bool {
    let applied = match &action.kind {
        ActionKind::Add => {
            store.append(action.task);
            true
        }
        ActionKind::Remove => store.remove_id(action.task).is_some(),
        ActionKind::Modify { after, .. } => store.replace(action.task, after.as_ref().clone()),
    };
    if !applied {
        debug!(kind = %action.tag(), task = %action.task, "redo found no task to re-apply");
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::TaskEdit;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn task(title: &str) -> Task {
        Task::new(
            title,
            "",
            3,
            NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            "Cat",
            "Sub",
        )
    }

    fn titles(store: &TaskStore) -> Vec<String> {
        store.iter().map(|(_, t)| t.title.clone()).collect()
    }

    /// Add a task and record it, the way the session does
    fn add(store: &mut TaskStore, history: &mut History, title: &str) -> TaskId {
        let (id, idx) = store.add(task(title)).unwrap();
        history.record(HistoryAction::add(id, idx));
        id
    }

    fn remove(store: &mut TaskStore, history: &mut History, title: &str) -> TaskId {
        let (id, idx) = store.remove_by_title(title).unwrap();
        history.record(HistoryAction::remove(id, idx));
        id
    }

    // -----------------------------------------------------------------------
    // Stack mechanics
    // -----------------------------------------------------------------------

    #[test]
    fn test_new_history_is_empty() {
        let history = History::new();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(history.peek_undo().is_none());
        assert!(history.peek_redo().is_none());
    }

    #[test]
    fn test_undo_redo_on_empty() {
        let mut store = TaskStore::new();
        let mut history = History::new();
        assert_eq!(history.undo(&mut store), Err(HistoryError::NothingToUndo));
        assert_eq!(history.redo(&mut store), Err(HistoryError::NothingToRedo));
    }

    #[test]
    fn test_record_clears_redo() {
        let mut store = TaskStore::new();
        let mut history = History::new();
        add(&mut store, &mut history, "A");
        history.undo(&mut store).unwrap();
        assert!(history.can_redo());

        add(&mut store, &mut history, "B");
        assert!(!history.can_redo());
        assert_eq!(history.redo(&mut store), Err(HistoryError::NothingToRedo));
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut store = TaskStore::new();
        let mut history = History::with_limit(3);
        for title in ["A", "B", "C", "D"] {
            add(&mut store, &mut history, title);
        }
        for _ in 0..3 {
            history.undo(&mut store).unwrap();
        }
        assert_eq!(history.undo(&mut store), Err(HistoryError::NothingToUndo));
        assert_eq!(titles(&store), vec!["A"]);
    }

    // -----------------------------------------------------------------------
    // Add
    // -----------------------------------------------------------------------

    #[test]
    fn test_undo_add_restores_previous_state() {
        let mut store = TaskStore::new();
        let mut history = History::new();
        add(&mut store, &mut history, "A");
        add(&mut store, &mut history, "B");
        let c = add(&mut store, &mut history, "C");

        let report = history.undo(&mut store).unwrap();
        assert_eq!(
            report,
            ActionReport {
                kind: ActionTag::Add,
                task: c,
                title: "C".into(),
            }
        );
        assert_eq!(titles(&store), vec!["A", "B"]);
    }

    #[test]
    fn test_redo_add_appends_again() {
        let mut store = TaskStore::new();
        let mut history = History::new();
        add(&mut store, &mut history, "A");
        add(&mut store, &mut history, "B");
        history.undo(&mut store).unwrap();

        let report = history.redo(&mut store).unwrap();
        assert_eq!(report.kind, ActionTag::Add);
        assert_eq!(report.title, "B");
        assert_eq!(titles(&store), vec!["A", "B"]);
    }

    #[test]
    fn test_undo_add_tracks_identity_across_rename() {
        let mut store = TaskStore::new();
        let mut history = History::new();
        let a = add(&mut store, &mut history, "A");
        add(&mut store, &mut history, "B");

        // rename without recording, so the Add for "A" is reachable after one undo
        let edit = TaskEdit {
            title: Some("renamed".into()),
            ..TaskEdit::default()
        };
        store.modify(a, &edit).unwrap();

        history.undo(&mut store).unwrap();
        let report = history.undo(&mut store).unwrap();
        assert_eq!(report.task, a);
        assert_eq!(report.title, "renamed");
        assert!(store.is_empty());
    }

    // -----------------------------------------------------------------------
    // Remove
    // -----------------------------------------------------------------------

    #[test]
    fn test_undo_remove_reinserts_at_original_index() {
        let mut store = TaskStore::new();
        let mut history = History::new();
        for title in ["A", "B", "C"] {
            add(&mut store, &mut history, title);
        }
        remove(&mut store, &mut history, "B");
        assert_eq!(titles(&store), vec!["A", "C"]);

        let report = history.undo(&mut store).unwrap();
        assert_eq!(report.kind, ActionTag::Remove);
        assert_eq!(report.title, "B");
        assert_eq!(titles(&store), vec!["A", "B", "C"]);

        history.redo(&mut store).unwrap();
        assert_eq!(titles(&store), vec!["A", "C"]);
    }

    #[test]
    fn test_undo_remove_past_end_appends() {
        let mut store = TaskStore::new();
        let mut history = History::new();
        for title in ["A", "B", "C"] {
            add(&mut store, &mut history, title);
        }
        let c = remove(&mut store, &mut history, "C");
        // shrink the store below the recorded index without touching history
        store.remove_by_title("A").unwrap();
        store.remove_by_title("B").unwrap();

        history.undo(&mut store).unwrap();
        assert_eq!(store.position(c), Some(0));
    }

    #[test]
    fn test_remove_action_without_position_appends() {
        let mut store = TaskStore::new();
        let mut history = History::new();
        let (a, _) = store.add(task("A")).unwrap();
        store.add(task("B")).unwrap();
        store.remove_id(a);
        history.record(HistoryAction {
            task: a,
            kind: ActionKind::Remove,
            original_position: None,
        });
        history.undo(&mut store).unwrap();
        assert_eq!(titles(&store), vec!["B", "A"]);
    }

    // -----------------------------------------------------------------------
    // Modify
    // -----------------------------------------------------------------------

    #[test]
    fn test_undo_redo_modify() {
        let mut store = TaskStore::new();
        let mut history = History::new();
        let a = add(&mut store, &mut history, "A");
        let edit = TaskEdit {
            title: Some("A2".into()),
            priority: Some(1),
            ..TaskEdit::default()
        };
        let before = store.modify(a, &edit).unwrap();
        let after = store.get(a).unwrap().clone();
        history.record(HistoryAction::modify(a, before, after));

        let report = history.undo(&mut store).unwrap();
        assert_eq!(report.kind, ActionTag::Modify);
        assert_eq!(report.title, "A");
        assert_eq!(store.get(a).unwrap().priority, 3);

        let report = history.redo(&mut store).unwrap();
        assert_eq!(report.title, "A2");
        assert_eq!(store.get(a).unwrap().priority, 1);
    }

    #[test]
    fn test_chained_undo_then_redo_all() {
        let mut store = TaskStore::new();
        let mut history = History::new();
        add(&mut store, &mut history, "A");
        add(&mut store, &mut history, "B");
        remove(&mut store, &mut history, "A");

        for _ in 0..3 {
            history.undo(&mut store).unwrap();
        }
        assert!(store.is_empty());
        for _ in 0..3 {
            history.redo(&mut store).unwrap();
        }
        assert_eq!(titles(&store), vec!["B"]);
    }

    #[test]
    fn test_replay_reports_missing_task() {
        let mut store = TaskStore::new();
        let mut history = History::new();
        let a = add(&mut store, &mut history, "A");
        store.remove_id(a);

        // the add no longer has a live task to take back
        assert!(!apply_inverse(&HistoryAction::add(a, 0), &mut store));
        assert!(!apply_forward(&HistoryAction::remove(a, 0), &mut store));
        let ghost = HistoryAction::modify(TaskId(99), task("X"), task("Y"));
        assert!(!apply_inverse(&ghost, &mut store));
        assert!(!apply_forward(&ghost, &mut store));
        assert!(store.is_empty());

        assert!(apply_inverse(&HistoryAction::remove(a, 0), &mut store));
        assert_eq!(titles(&store), vec!["A"]);
    }
}
