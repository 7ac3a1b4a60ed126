//! Cache Entry Module
//!
//! Defines the structure for individual cache store entries with TTL support.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

// == Cache Entry ==
/// Represents a single cache store entry with value and expiry metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry with optional TTL.
    pub fn new(value: V, ttl: Option<Duration>) -> Self {
        let now = current_timestamp_ms();
        let expires_at = ttl.map(|ttl| now + ttl.as_millis() as u64);

        Self {
            value,
            created_at: now,
            expires_at,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is considered expired when the current time
    /// is greater than or equal to the expiration time.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => current_timestamp_ms() >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    ///
    /// Returns `Some(0)` once the TTL has elapsed.
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        self.expires_at.map(|expires| {
            let now = current_timestamp_ms();
            expires.saturating_sub(now)
        })
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
