//! Cache Statistics Module

use serde::Serialize;

// == Cache Stats ==
/// Counters describing how well the cache shields the provider.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CacheStats {
    /// Reads answered from a fresh entry
    pub hits: u64,
    /// Reads that found nothing or only a stale entry
    pub misses: u64,
    /// Payloads written after a successful fetch
    pub stores: u64,
    /// Entries dropped by the size bound
    pub evictions: u64,
    /// Entries currently held, stale ones included
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// hits / (hits + misses), 0.0 before any read.
    pub fn hit_rate(&self) -> f64 {
        let reads = self.hits + self.misses;
        if reads == 0 {
            0.0
        } else {
            self.hits as f64 / reads as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_store(&mut self) {
        self.stores += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }
}
