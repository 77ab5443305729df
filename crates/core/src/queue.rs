//! FIFO queue used for breadth-first walks.

use std::collections::VecDeque;

use crate::error::{PlyError, PlyResult};

/// First-in first-out queue with fallible `dequeue`/`peek`.
#[derive(Debug, Clone, Default)]
pub struct Queue<T> {
    items: VecDeque<T>,
}

impl<T> Queue<T> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    /// Create an empty queue that can hold `capacity` items without growing.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
        }
    }

    /// Append to the back.
    pub fn enqueue(&mut self, item: T) {
        self.items.push_back(item);
    }

    /// Remove from the front.
    pub fn dequeue(&mut self) -> PlyResult<T> {
        self.items.pop_front().ok_or(PlyError::QueueEmpty)
    }

    /// Look at the front.
    pub fn peek(&self) -> PlyResult<&T> {
        self.items.front().ok_or(PlyError::QueueEmpty)
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Extend<T> for Queue<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl<T> FromIterator<T> for Queue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
