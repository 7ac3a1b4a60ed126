//! Indexed Cache - a queryable collection married to a cache store
//!
//! Marries a predicate-queryable collection with a key-value cache store
//! that provides TTL expiry, LRU eviction and hit/miss statistics. The two
//! stores are kept eventually consistent in both directions: collection
//! writes are mirrored into the store by an ordered background actor, and
//! store-originated changes (external puts, removals, evictions, expiry)
//! are mirrored back into the collection by a reverse-sync listener.

pub mod cache;
pub mod collection;
pub mod config;
pub mod error;
pub mod sync;
pub mod tasks;

pub use cache::{CacheEvent, CacheStats, CacheStore, StatsSnapshot};
pub use collection::ConcurrentIndexedSet;
pub use config::Config;
pub use error::{CacheError, Result};
pub use sync::{
    CacheKey, CacheKeyMaker, FnKeyMaker, IdentityKeyMaker, IndexedCache, IndexedCacheBuilder,
    SentinelKeyMaker, SharedCacheStore, UniqueKeyMaker,
};
pub use tasks::spawn_cleanup_task;
