//! Fixed-capacity history buffers.
//!
//! [`BoundedLog`] backs the pulse history (appended at the back, oldest
//! first) and the event log (prepended at the front, newest first). In
//! both orientations the entry that has been in the buffer longest is the
//! one evicted, and the buffer never holds more than its capacity.

use std::collections::VecDeque;

/// A ring of at most `capacity` entries with strict oldest-first eviction.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedLog<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedLog<T> {
    /// Create an empty log. A zero capacity is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append at the back, evicting from the front when full.
    ///
    /// Use for logs kept in chronological order (oldest first).
    /// Returns the evicted entry, if any.
    pub fn push_back(&mut self, entry: T) -> Option<T> {
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }

    /// Prepend at the front, evicting from the back when full.
    ///
    /// Use for logs kept in reverse-chronological order (newest first).
    /// Returns the evicted entry, if any.
    pub fn push_front(&mut self, entry: T) -> Option<T> {
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_back()
        } else {
            None
        };
        self.entries.push_front(entry);
        evicted
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry at the front, if any.
    pub fn front(&self) -> Option<&T> {
        self.entries.front()
    }
}

impl<T: Clone> BoundedLog<T> {
    /// Copy the entries front to back into a `Vec`.
    pub fn to_vec(&self) -> Vec<T> {
        self.entries.iter().cloned().collect()
    }
}

/// Append to a plain deque under the same eviction rule as
/// [`BoundedLog::push_back`].
///
/// Jets carry their signal history as a bare `VecDeque` so it serializes
/// directly; this keeps the bound enforced in one place.
pub fn push_back_bounded<T>(entries: &mut VecDeque<T>, capacity: usize, entry: T) {
    let capacity = capacity.max(1);
    while entries.len() >= capacity {
        entries.pop_front();
    }
    entries.push_back(entry);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_back_evicts_oldest_and_keeps_order() {
        let mut log = BoundedLog::new(100);
        for i in 0..101_u32 {
            log.push_back(i);
        }
        assert_eq!(log.len(), 100);
        assert_eq!(log.front(), Some(&1));
        let expected: Vec<u32> = (1..=100).collect();
        assert_eq!(log.to_vec(), expected);
    }

    #[test]
    fn push_front_keeps_newest_first() {
        let mut log = BoundedLog::new(50);
        for i in 0..75_u32 {
            let evicted = log.push_front(i);
            assert!(log.len() <= 50);
            assert_eq!(evicted, i.checked_sub(50));
            assert_eq!(log.front(), Some(&i));
        }
        let values = log.to_vec();
        assert_eq!(values.last(), Some(&25));
        assert!(values.windows(2).all(|w| matches!(w, [a, b] if a > b)));
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut log = BoundedLog::new(0);
        log.push_back("a");
        log.push_back("b");
        assert_eq!(log.len(), 1);
        assert_eq!(log.to_vec(), vec!["b"]);
    }

    #[test]
    fn bounded_deque_helper_matches_log() {
        let mut deque = VecDeque::new();
        for i in 0..10_u8 {
            push_back_bounded(&mut deque, 3, i);
        }
        assert_eq!(deque, VecDeque::from(vec![7, 8, 9]));
    }
}
