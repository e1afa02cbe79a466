use tracing::{debug, info, warn};

use crate::model::config::Config;
use crate::model::task::DEFAULT_DATE_FORMAT;
use crate::model::task::{Task, TaskEdit, TaskId};
use crate::ops::category_tree::CategoryTree;
use crate::ops::history::{ActionReport, History, HistoryAction, HistoryError};
use crate::ops::task_store::{StoreError, TaskStore};
use crate::ops::urgent_queue::{QueueError, UrgentQueue};

/// Error type for session operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Queue(#[from] QueueError),
}

/// All task-manager state for one run: the store, its history, the category
/// index and the urgent queue.
///
/// Every flow the shell offers goes through here so that a mutation and its
/// bookkeeping (history entry, category index) always happen together.
#[derive(Debug)]
pub struct Session {
    store: TaskStore,
    history: History,
    categories: CategoryTree,
    urgent: UrgentQueue,
    date_format: String,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl Session {
    /// Build an empty session. An unusable `date_format` falls back to the
    /// default so listings can always be rendered.
    pub fn new(config: &Config) -> Self {
        let date_format = if config.display.date_format_is_valid() {
            config.display.date_format.clone()
        } else {
            warn!(format = %config.display.date_format, "invalid date format, using default");
            DEFAULT_DATE_FORMAT.to_string()
        };
        Session {
            store: TaskStore::new(),
            history: History::with_limit(config.history.limit),
            categories: CategoryTree::new(config.display.root_label.clone()),
            urgent: UrgentQueue::new(),
            date_format,
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn categories(&self) -> &CategoryTree {
        &self.categories
    }

    pub fn urgent(&self) -> &UrgentQueue {
        &self.urgent
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    // -----------------------------------------------------------------------
    // Task CRUD
    // -----------------------------------------------------------------------

    /// Add a task, record it for undo and index it by category.
    pub fn add_task(&mut self, task: Task) -> Result<TaskId, SessionError> {
        let (id, idx) = self
            .store
            .add(task)
            .inspect_err(|e| info!(error = %e, "add rejected"))?;
        self.history.record(HistoryAction::add(id, idx));
        if let Some(task) = self.store.get(id) {
            self.categories.index(id, task);
        }
        debug!(task = %id, index = idx, "added task");
        Ok(id)
    }

    /// Remove a task by title and record it for undo.
    pub fn remove_task(&mut self, title: &str) -> Result<TaskId, SessionError> {
        let (id, idx) = self
            .store
            .remove_by_title(title)
            .inspect_err(|e| info!(error = %e, "remove rejected"))?;
        self.history.record(HistoryAction::remove(id, idx));
        debug!(task = %id, index = idx, "removed task");
        Ok(id)
    }

    /// Edit a task in place and record the before/after snapshots for undo.
    /// The category index is not updated.
    pub fn modify_task(&mut self, title: &str, edit: &TaskEdit) -> Result<TaskId, SessionError> {
        let id = self.store.find_by_title(title)?;
        let before = self
            .store
            .modify(id, edit)
            .inspect_err(|e| info!(error = %e, "modify rejected"))?;
        let after = self.store.get(id).cloned().unwrap_or_else(|| before.clone());
        self.history.record(HistoryAction::modify(id, before, after));
        debug!(task = %id, "modified task");
        Ok(id)
    }

    pub fn find(&self, title: &str) -> Result<(TaskId, &Task), SessionError> {
        let id = self.store.find_by_title(title)?;
        let task = self
            .store
            .get(id)
            .ok_or_else(|| StoreError::NotFound(title.to_string()))?;
        Ok((id, task))
    }

    /// Live tasks by priority, then due date
    pub fn sorted_tasks(&self) -> Vec<(TaskId, &Task)> {
        self.store.sorted_by_priority_then_due()
    }

    // -----------------------------------------------------------------------
    // Undo / redo
    // -----------------------------------------------------------------------

    pub fn undo(&mut self) -> Result<ActionReport, SessionError> {
        Ok(self.history.undo(&mut self.store)?)
    }

    pub fn redo(&mut self) -> Result<ActionReport, SessionError> {
        Ok(self.history.redo(&mut self.store)?)
    }

    // -----------------------------------------------------------------------
    // Urgent queue
    // -----------------------------------------------------------------------

    /// Queue the live task with this title for urgent processing.
    pub fn mark_urgent(&mut self, title: &str) -> Result<TaskId, SessionError> {
        let id = self.store.find_by_title(title)?;
        self.urgent.enqueue(id);
        debug!(task = %id, pending = self.urgent.len(), "queued urgent task");
        Ok(id)
    }

    /// Take the next urgent task. A task removed from the store after being
    /// queued is still returned.
    pub fn process_urgent(&mut self) -> Result<(TaskId, &Task), SessionError> {
        let id = self.urgent.dequeue()?;
        debug!(task = %id, pending = self.urgent.len(), "processed urgent task");
        let task = self
            .store
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok((id, task))
    }

    /// Queued urgent tasks, front first
    pub fn urgent_pending(&self) -> Vec<(TaskId, &Task)> {
        self.urgent
            .iter()
            .filter_map(|id| self.store.get(id).map(|t| (id, t)))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Category view
    // -----------------------------------------------------------------------

    /// The category tree as indented text lines
    pub fn category_lines(&self) -> impl Iterator<Item = String> + '_ {
        self.categories.render_text(&self.store, &self.date_format)
    }
}
