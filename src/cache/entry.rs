//! Cache Entry Module
//!
//! A stored provider payload plus the moment it was written.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde_json::Value;

// == Cache Entry ==
/// One cached provider response.
///
/// Immutable once written; a re-fetch replaces the whole entry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Provider payload, passed through untouched
    pub data: Value,
    /// Monotonic write time used for freshness checks
    pub stored_at: Instant,
    /// Wall-clock write time, for logs and diagnostics
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Wraps a payload stamped with the current time.
    pub fn new(data: Value) -> Self {
        Self::stored_at(data, Instant::now())
    }

    /// Wraps a payload with an explicit write time.
    pub fn stored_at(data: Value, stored_at: Instant) -> Self {
        Self {
            data,
            stored_at,
            fetched_at: Utc::now(),
        }
    }

    /// Age of the entry at `now`. Zero if `now` precedes the write.
    pub fn age_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.stored_at)
    }

    // == Freshness ==
    /// True while the entry is strictly younger than `ttl`.
    ///
    /// An entry whose age equals the TTL is already stale.
    pub fn is_fresh_at(&self, now: Instant, ttl: Duration) -> bool {
        self.age_at(now) < ttl
    }

    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.is_fresh_at(Instant::now(), ttl)
    }
}
