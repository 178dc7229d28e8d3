//! History log
//!
//! An append-only, bounded log of picks. New items go to the head, so the
//! log is always most-recent-first both in memory and on disk. Once the log
//! is over capacity the oldest items are evicted from the tail.

mod filter;

use std::collections::{HashMap, VecDeque};

use crate::config::DEFAULT_HISTORY_CAPACITY;
use crate::types::{HistoryItem, SelectionMode};

pub use filter::HistoryFilter;

/// Bounded most-recent-first pick log
#[derive(Debug, Clone)]
pub struct HistoryLog {
    items: VecDeque<HistoryItem>,
    capacity: usize,
}

impl HistoryLog {
    /// Create an empty log with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// Create an empty log holding at most `capacity` items (minimum 1)
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Wrap items loaded from disk (already most-recent-first)
    pub fn from_items(items: Vec<HistoryItem>, capacity: usize) -> Self {
        let mut log = Self::with_capacity(capacity);
        log.items = items.into();
        log.items.truncate(log.capacity);
        log
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Insert at the head, evicting from the tail past capacity
    ///
    /// Returns how many items were evicted.
    pub fn append(&mut self, item: HistoryItem) -> usize {
        self.items.push_front(item);
        let evicted = self.items.len().saturating_sub(self.capacity);
        self.items.truncate(self.capacity);
        evicted
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryItem> {
        self.items.iter()
    }

    /// Copy of the whole log, most recent first
    pub fn to_vec(&self) -> Vec<HistoryItem> {
        self.items.iter().cloned().collect()
    }

    /// The `count` most recent items
    pub fn recent(&self, count: usize) -> Vec<HistoryItem> {
        self.items.iter().take(count).cloned().collect()
    }

    /// Items passing every set filter, most recent first
    pub fn filter(&self, filter: &HistoryFilter) -> Vec<HistoryItem> {
        let matches = filter.matcher();
        self.items.iter().filter(|item| matches(item)).cloned().collect()
    }

    /// Individual-pick counts per selected name
    pub fn statistics(&self) -> HashMap<String, usize> {
        let mut stats = HashMap::new();
        for item in self.items.iter().filter(|i| i.mode == SelectionMode::Individual) {
            *stats.entry(item.selected_name.clone()).or_insert(0) += 1;
        }
        stats
    }

    /// Statistics ordered by count (descending), then name
    pub fn ranked_statistics(&self) -> Vec<(String, usize)> {
        let mut ranked: Vec<(String, usize)> = self.statistics().into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new()
    }
}
