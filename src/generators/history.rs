// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Capped history of generated entries.

/// Most entries a history holds before it starts over
pub const HISTORY_LIMIT: usize = 128;

/// Append-only buffer that empties itself once full.
///
/// Long-running generation never grows it past the limit. The newest entry
/// always survives an append, so callers can read it back.
#[derive(Debug, Clone, PartialEq)]
pub struct History<T> {
    entries: Vec<T>,
    limit: usize,
}

impl<T> History<T> {
    pub fn new() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }

    /// History with a custom limit (at least 1)
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Append an entry, clearing first when the buffer is full
    pub fn push(&mut self, entry: T) -> &T {
        if self.entries.len() >= self.limit {
            self.entries.clear();
        }
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// Replace all entries, keeping only the newest `limit` of them
    pub fn replace(&mut self, mut entries: Vec<T>) {
        if entries.len() > self.limit {
            entries.drain(..entries.len() - self.limit);
        }
        self.entries = entries;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn last(&self) -> Option<&T> {
        self.entries.last()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_returns_newest() {
        let mut history = History::new();
        assert_eq!(*history.push(1), 1);
        assert_eq!(*history.push(2), 2);
        assert_eq!(history.as_slice(), &[1, 2]);
        assert_eq!(history.last(), Some(&2));
    }

    #[test]
    fn test_never_exceeds_limit() {
        let mut history = History::new();
        for i in 0..1000 {
            history.push(i);
            assert!(history.len() <= HISTORY_LIMIT);
            assert_eq!(history.last(), Some(&i));
        }
    }

    #[test]
    fn test_clears_when_full() {
        let mut history = History::with_limit(3);
        history.push('a');
        history.push('b');
        history.push('c');
        assert_eq!(history.len(), 3);
        history.push('d');
        assert_eq!(history.as_slice(), &['d']);
    }

    #[test]
    fn test_replace_and_clear() {
        let mut history = History::with_limit(0);
        assert_eq!(history.limit(), 1);
        history.replace(vec![1, 2, 3]);
        assert_eq!(history.as_slice(), &[3]);
        history.push(4);
        assert_eq!(history.as_slice(), &[4]);
        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn test_replace_keeps_newest_within_limit() {
        let mut history = History::new();
        history.replace((0..500).collect());
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history.as_slice()[0], 500 - HISTORY_LIMIT as i32);
        assert_eq!(history.last(), Some(&499));
    }
}
