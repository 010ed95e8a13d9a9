use std::collections::VecDeque;

use serde::Serialize;

/// Fixed-capacity sequence that drops its oldest entry once full.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct BoundedHistory<T> {
    #[serde(skip)]
    capacity: usize,
    items: VecDeque<T>,
}

impl<T: Clone> BoundedHistory<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            items: VecDeque::with_capacity(capacity),
        }
    }

    /// Appends `item`, returning the evicted entry if the history was full.
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() == self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_once_full() {
        let mut history = BoundedHistory::new(100);
        for i in 0..100 {
            assert!(history.push(i).is_none());
        }
        assert_eq!(history.len(), 100);

        assert_eq!(history.push(100), Some(0));
        assert_eq!(history.len(), 100);

        let items = history.to_vec();
        assert_eq!(items.first(), Some(&1));
        assert_eq!(items.last(), Some(&100));
        assert!(!items.contains(&0));
    }

    #[test]
    fn length_never_exceeds_capacity() {
        let mut history = BoundedHistory::new(60);
        for i in 0..500 {
            history.push(i as f32);
            assert!(history.len() <= 60);
        }
        assert_eq!(history.latest(), Some(&499.0));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut history = BoundedHistory::new(0);
        history.push("a");
        history.push("b");
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.to_vec(), vec!["b"]);
    }

    #[test]
    fn serializes_as_plain_sequence() {
        let mut history = BoundedHistory::new(3);
        history.push(1);
        history.push(2);
        assert_eq!(serde_json::to_string(&history).unwrap(), "[1,2]");
    }
}
