use std::collections::VecDeque;

use crate::model::task::TaskId;

/// Error type for urgent queue operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("no urgent tasks to process")]
    Empty,
}

/// FIFO of tasks flagged urgent. The same task may be queued more than once.
#[derive(Debug, Default)]
pub struct UrgentQueue {
    items: VecDeque<TaskId>,
}

impl UrgentQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, id: TaskId) {
        self.items.push_back(id);
    }

    /// Take the earliest-queued task
    pub fn dequeue(&mut self) -> Result<TaskId, QueueError> {
        self.items.pop_front().ok_or(QueueError::Empty)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Pending tasks, front of the queue first
    pub fn iter(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.items.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dequeue_empty() {
        let mut queue = UrgentQueue::new();
        assert_eq!(queue.dequeue(), Err(QueueError::Empty));
    }

    #[test]
    fn test_fifo_order() {
        let mut queue = UrgentQueue::new();
        queue.enqueue(TaskId(1));
        queue.enqueue(TaskId(2));
        assert_eq!(queue.dequeue(), Ok(TaskId(1)));
        assert_eq!(queue.dequeue(), Ok(TaskId(2)));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_duplicates_allowed() {
        let mut queue = UrgentQueue::new();
        queue.enqueue(TaskId(7));
        queue.enqueue(TaskId(7));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.iter().collect::<Vec<_>>(), vec![TaskId(7), TaskId(7)]);
    }
}
