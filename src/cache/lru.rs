//! LRU Tracker Module
//!
//! Recency bookkeeping for the optional cache size bound.

use std::collections::{BTreeMap, HashMap};

use crate::cache::CacheKey;

// == LRU Tracker ==
/// Orders keys by last use.
///
/// Every touch stamps the key with a fresh tick; the smallest tick is the
/// least recently used key.
#[derive(Debug, Default)]
pub struct LruTracker {
    by_tick: BTreeMap<u64, CacheKey>,
    ticks: HashMap<CacheKey, u64>,
    clock: u64,
}

impl LruTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `key` as most recently used.
    pub fn touch(&mut self, key: &CacheKey) {
        self.clock += 1;
        if let Some(old) = self.ticks.insert(key.clone(), self.clock) {
            self.by_tick.remove(&old);
        }
        self.by_tick.insert(self.clock, key.clone());
    }

    pub fn remove(&mut self, key: &CacheKey) {
        if let Some(tick) = self.ticks.remove(key) {
            self.by_tick.remove(&tick);
        }
    }

    /// Removes and returns the least recently used key.
    pub fn pop_oldest(&mut self) -> Option<CacheKey> {
        let (_, key) = self.by_tick.pop_first()?;
        self.ticks.remove(&key);
        Some(key)
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }
}
