//! Transition tuples and the bounded trailing log

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::state::{Action, Reward, StateKey};

/// A single transition (s, a, r, s')
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub state: StateKey,
    pub action: Action,
    pub reward: Reward,
    pub next_state: StateKey,
}

impl Experience {
    /// Create a new experience
    pub fn new(state: StateKey, action: Action, reward: Reward, next_state: StateKey) -> Self {
        Self {
            state,
            action,
            reward,
            next_state,
        }
    }
}

/// Fixed-capacity FIFO log; pushing past capacity evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct BoundedLog<T> {
    buffer: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedLog<T> {
    /// Create a log holding at most `capacity` entries (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, evicting the oldest when full
    pub fn push(&mut self, entry: T) {
        if self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(entry);
    }

    /// Oldest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.buffer.iter()
    }

    /// Newest first
    pub fn iter_recent(&self) -> impl Iterator<Item = &T> {
        self.buffer.iter().rev()
    }

    pub fn latest(&self) -> Option<&T> {
        self.buffer.back()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl<T: Clone> BoundedLog<T> {
    /// Owned copy, oldest first
    pub fn to_vec(&self) -> Vec<T> {
        self.buffer.iter().cloned().collect()
    }

    /// Owned copy, newest first
    pub fn to_vec_recent(&self) -> Vec<T> {
        self.buffer.iter().rev().cloned().collect()
    }
}
