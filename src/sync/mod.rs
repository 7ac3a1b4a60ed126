//! Synchronization Module
//!
//! The glue that keeps the indexed collection and the cache store presenting
//! one consistent view: the facade wrapping collection operations, the
//! ordered maintenance actor mirroring them into the store, and the
//! reverse-sync listener mirroring store-originated changes back.

mod actor;
mod facade;
mod key;
mod listener;

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::cache::CacheStore;

pub use actor::MaintenanceTask;
pub use facade::{IndexedCache, IndexedCacheBuilder};
pub use key::{
    CacheKey, CacheKeyMaker, FnKeyMaker, IdentityKeyMaker, SentinelKeyMaker, UniqueKeyMaker,
};

/// A cache store keyed by [`CacheKey`], shared between the facade, the
/// maintenance actor and any background sweep.
pub type SharedCacheStore<K, V> = Arc<RwLock<CacheStore<CacheKey<K>, V>>>;
