//! Cache Statistics Module
//!
//! Tracks cache store performance metrics including hits, misses, evictions
//! and expirations.
//!
//! The counters live behind an `Arc` handle that the store hands out at
//! creation time, so consumers read statistics directly instead of
//! discovering them through some global registry.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Shared, lock-free performance counters for a cache store.
///
/// All methods take `&self`; the handle can be read concurrently with
/// store mutations.
#[derive(Debug, Default)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    hits: AtomicU64,
    /// Number of failed cache retrievals (key not found or expired)
    misses: AtomicU64,
    /// Number of entries evicted due to LRU policy
    evictions: AtomicU64,
    /// Number of entries removed because their TTL elapsed
    expirations: AtomicU64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Eviction ==
    /// Increments the eviction counter.
    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Expiration ==
    /// Increments the expiration counter.
    pub fn record_expiration(&self) {
        self.expirations.fetch_add(1, Ordering::Relaxed);
    }

    // == Reset ==
    /// Resets all counters to zero.
    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
        self.expirations.store(0, Ordering::Relaxed);
    }

    // == Counter Reads ==
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    pub fn expirations(&self) -> u64 {
        self.expirations.load(Ordering::Relaxed)
    }

    // == Snapshot ==
    /// Captures a consistent point-in-time view of the counters.
    pub fn snapshot(&self, total_entries: usize) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits(),
            misses: self.misses(),
            evictions: self.evictions(),
            expirations: self.expirations(),
            total_entries,
        }
    }
}

// == Stats Snapshot ==
/// Serializable point-in-time view of the cache store counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    /// Current number of entries in the cache store
    pub total_entries: usize,
}

impl StatsSnapshot {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
