//! Cache Store Module
//!
//! Provides the key-value side of the indexed cache: in-memory storage with
//! TTL expiration, LRU eviction, hit/miss statistics and change-event
//! emission.

mod entry;
mod events;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use events::CacheEvent;
pub use lru::LruTracker;
pub use stats::{CacheStats, StatsSnapshot};
pub use store::CacheStore;
