//! Cache Store Module
//!
//! Keyed TTL storage for provider payloads. Staleness is checked on read;
//! stale entries stay in place until overwritten, swept, or evicted.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::debug;

use crate::cache::{CacheEntry, CacheKey, CacheStats, LruTracker};

// == Cache Store ==
/// In-memory response cache with a fixed freshness window.
#[derive(Debug)]
pub struct CacheStore {
    entries: HashMap<CacheKey, CacheEntry>,
    /// Recency order, only maintained when bounded
    lru: LruTracker,
    stats: CacheStats,
    ttl: Duration,
    /// 0 = unbounded
    max_entries: usize,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty, unbounded store.
    ///
    /// # Arguments
    /// * `ttl` - How long an entry stays fresh after it is written
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            ttl,
            max_entries: 0,
        }
    }

    /// Caps the store at `max_entries` keys, evicting the least recently
    /// used key on overflow. 0 keeps it unbounded.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    fn is_bounded(&self) -> bool {
        self.max_entries > 0
    }

    // == Is Valid ==
    /// True iff an entry exists for `key` and is younger than the TTL.
    pub fn is_valid(&self, key: &CacheKey) -> bool {
        self.is_valid_at(key, Instant::now())
    }

    pub fn is_valid_at(&self, key: &CacheKey, now: Instant) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| entry.is_fresh_at(now, self.ttl))
    }

    // == Get ==
    /// Returns the payload for `key` if it is still fresh.
    ///
    /// Records a hit or miss. Stale entries are left in place.
    pub fn get(&mut self, key: &CacheKey) -> Option<Value> {
        let now = Instant::now();
        match self.entries.get(key) {
            Some(entry) if entry.is_fresh_at(now, self.ttl) => {
                let data = entry.data.clone();
                debug!(key = %key, fetched_at = %entry.fetched_at, "Cache hit");
                self.stats.record_hit();
                if self.is_bounded() {
                    self.lru.touch(key);
                }
                Some(data)
            }
            _ => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Like `get`, without touching statistics or recency.
    pub fn peek(&self, key: &CacheKey) -> Option<Value> {
        self.entries
            .get(key)
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| entry.data.clone())
    }

    // == Put ==
    /// Stores `data` under `key`, replacing any previous entry wholesale.
    pub fn put(&mut self, key: CacheKey, data: Value) {
        self.insert(key, CacheEntry::new(data));
    }

    /// Stores a prepared entry; lets callers control the write time.
    pub fn insert(&mut self, key: CacheKey, entry: CacheEntry) {
        if self.is_bounded() {
            if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
                if let Some(evicted) = self.lru.pop_oldest() {
                    self.entries.remove(&evicted);
                    self.stats.record_eviction();
                    debug!(key = %evicted, "Evicted least recently used entry");
                }
            }
            self.lru.touch(&key);
        }

        debug!(key = %key, "Cached data");
        self.entries.insert(key, entry);
        self.stats.record_store();
    }

    // == Cleanup Expired ==
    /// Drops every stale entry. Returns how many were removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = Instant::now();
        let ttl = self.ttl;
        let stale: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_fresh_at(now, ttl))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &stale {
            self.entries.remove(key);
            self.lru.remove(key);
        }
        stale.len()
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            total_entries: self.entries.len(),
            ..self.stats.clone()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
