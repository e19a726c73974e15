use std::collections::VecDeque;

use crate::error::{MonitorError, Result};

pub const DEFAULT_HISTORY_SIZE: usize = 60;

/// Fixed-capacity circular buffer that overwrites its oldest entry.
///
/// The buffer is a plain owned value; holders that share it across threads
/// put it behind their own lock, which serializes `push` and `snapshot`.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    capacity: usize,
    items: VecDeque<T>,
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(MonitorError::invalid_configuration(
                "ring buffer capacity must be greater than zero",
            ));
        }

        Ok(Self {
            capacity,
            items: VecDeque::with_capacity(capacity),
        })
    }

    /// Append an item, evicting the oldest one once the buffer is full.
    pub fn push(&mut self, item: T) {
        if self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn clear(&mut self) {
        self.items.clear();
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
}

impl<T> Default for RingBuffer<T> {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_HISTORY_SIZE,
            items: VecDeque::with_capacity(DEFAULT_HISTORY_SIZE),
        }
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Copy of every retained item, oldest first
    pub fn snapshot(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_rejected() {
        let result = RingBuffer::<u32>::new(0);
        assert!(matches!(result, Err(MonitorError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_overwrites_oldest() {
        let mut buffer = RingBuffer::new(3).unwrap();
        for i in 1..=5 {
            buffer.push(i);
        }

        assert_eq!(buffer.snapshot(), vec![3, 4, 5]);
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.latest(), Some(&5));
    }

    #[test]
    fn test_order_preserved_under_capacity() {
        let mut buffer = RingBuffer::new(5).unwrap();
        buffer.push(10);
        buffer.push(20);
        buffer.push(30);

        assert_eq!(buffer.snapshot(), vec![10, 20, 30]);
        assert_eq!(buffer.iter().copied().collect::<Vec<_>>(), vec![10, 20, 30]);
    }

    #[test]
    fn test_long_run_keeps_last_items() {
        let mut buffer = RingBuffer::new(7).unwrap();
        for i in 0..1000 {
            buffer.push(i);
        }

        let expected: Vec<_> = (993..1000).collect();
        assert_eq!(buffer.snapshot(), expected);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut buffer = RingBuffer::new(4).unwrap();
        buffer.push("a");
        buffer.push("b");
        buffer.clear();

        assert!(buffer.is_empty());
        assert!(buffer.snapshot().is_empty());
        assert_eq!(buffer.capacity(), 4);

        buffer.push("c");
        assert_eq!(buffer.snapshot(), vec!["c"]);
    }
}
