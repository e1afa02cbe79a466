use std::collections::HashMap;

use crate::model::task::{Task, TaskEdit, TaskId};

/// Error type for task store operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("a task titled '{0}' already exists")]
    DuplicateTitle(String),
    #[error("task not found: {0}")]
    NotFound(String),
}

/// The ordered collection of live tasks.
///
/// Every task ever added stays in the backing table for the life of the store,
/// keyed by its `TaskId`. Only `order` decides which tasks are live and where
/// they sit, so removing a task never invalidates an id held elsewhere.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: HashMap<TaskId, Task>,
    order: Vec<TaskId>,
    next_id: u64,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Look up any task the store has ever held, live or removed.
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    pub fn is_live(&self, id: TaskId) -> bool {
        self.order.contains(&id)
    }

    /// Index of a live task in store order
    pub fn position(&self, id: TaskId) -> Option<usize> {
        self.order.iter().position(|&t| t == id)
    }

    /// Live tasks in store (insertion) order
    pub fn iter(&self) -> impl Iterator<Item = (TaskId, &Task)> + '_ {
        self.order.iter().map(|&id| (id, &self.tasks[&id]))
    }

    pub fn find_by_title(&self, title: &str) -> Result<TaskId, StoreError> {
        self.live_id_by_title(title)
            .ok_or_else(|| StoreError::NotFound(title.to_string()))
    }

    /// Live tasks sorted by priority, ties broken by due date.
    /// The sort is stable, so equal keys keep store order.
    pub fn sorted_by_priority_then_due(&self) -> Vec<(TaskId, &Task)> {
        let mut tasks: Vec<_> = self.iter().collect();
        tasks.sort_by(|(_, a), (_, b)| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.due_date.cmp(&b.due_date))
        });
        tasks
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Append a new task. Returns its id and index in store order.
    pub fn add(&mut self, task: Task) -> Result<(TaskId, usize), StoreError> {
        if self.live_id_by_title(&task.title).is_some() {
            return Err(StoreError::DuplicateTitle(task.title));
        }
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.insert(id, task);
        self.order.push(id);
        Ok((id, self.order.len() - 1))
    }

    /// Remove the live task with this title. Returns its id and former index.
    pub fn remove_by_title(&mut self, title: &str) -> Result<(TaskId, usize), StoreError> {
        let idx = self
            .order
            .iter()
            .position(|id| self.tasks[id].title == title)
            .ok_or_else(|| StoreError::NotFound(title.to_string()))?;
        let id = self.order.remove(idx);
        Ok((id, idx))
    }

    /// Apply a partial edit to a task in place. Returns a snapshot of the task
    /// as it was before the edit.
    ///
    /// A rename onto the title of another live task is rejected before any
    /// field changes.
    pub fn modify(&mut self, id: TaskId, edit: &TaskEdit) -> Result<Task, StoreError> {
        if let Some(new_title) = &edit.title
            && let Some(other) = self.live_id_by_title(new_title)
            && other != id
        {
            return Err(StoreError::DuplicateTitle(new_title.clone()));
        }
        let task = self
            .tasks
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let before = task.clone();
        task.apply(edit);
        Ok(before)
    }

    // -----------------------------------------------------------------------
    // Identity-based primitives used by undo/redo
    // -----------------------------------------------------------------------

    /// Insert a known task at `index`, or append when `index` is past the end.
    /// Returns the index it landed at.
    pub(crate) fn insert_at(&mut self, id: TaskId, index: usize) -> usize {
        if index <= self.order.len() {
            self.order.insert(index, id);
            index
        } else {
            self.append(id)
        }
    }

    /// Append a known task. Returns the index it landed at.
    pub(crate) fn append(&mut self, id: TaskId) -> usize {
        self.order.push(id);
        self.order.len() - 1
    }

    /// Drop a task from the live order by identity. Returns its former index.
    pub(crate) fn remove_id(&mut self, id: TaskId) -> Option<usize> {
        let idx = self.position(id)?;
        self.order.remove(idx);
        Some(idx)
    }

    /// Overwrite every field of a known task.
    pub(crate) fn replace(&mut self, id: TaskId, task: Task) -> bool {
        match self.tasks.get_mut(&id) {
            Some(slot) => {
                *slot = task;
                true
            }
            None => false,
        }
    }

    fn live_id_by_title(&self, title: &str) -> Option<TaskId> {
        self.order
            .iter()
            .copied()
            .find(|id| self.tasks[id].title == title)
    }
}
