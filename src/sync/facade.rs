//! Synchronization Facade Module
//!
//! The public surface of the indexed cache: wraps every collection
//! operation, queues the matching cache-store maintenance work, and owns the
//! reverse-sync listener registration.
//!
//! Construction is two-phase: [`IndexedCacheBuilder`] gathers the parts,
//! [`IndexedCacheBuilder::start`] registers the store listener and spawns
//! the background tasks, returning the live facade. No callback is ever
//! registered against a half-built object.

use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cache::{CacheStats, CacheStore, StatsSnapshot};
use crate::collection::ConcurrentIndexedSet;
use crate::error::{CacheError, Result};
use crate::sync::actor::{spawn_maintenance_actor, MaintenanceTask};
use crate::sync::key::{CacheKey, CacheKeyMaker, SentinelKeyMaker, UniqueKeyMaker};
use crate::sync::listener::spawn_reverse_sync_listener;
use crate::sync::SharedCacheStore;

// == Builder ==
/// Gathers the collection, the cache store and the key strategies before
/// anything is wired together.
pub struct IndexedCacheBuilder<K, V> {
    collection: Arc<ConcurrentIndexedSet<V>>,
    store: CacheStore<CacheKey<K>, V>,
    key_maker: Arc<dyn CacheKeyMaker<K, V>>,
    unique_keys: Arc<dyn UniqueKeyMaker<K>>,
}

impl<K, V> IndexedCacheBuilder<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Eq + Hash + Clone + Send + Sync + 'static,
{
    /// Starts a builder from a cache store and a key derivation strategy,
    /// with a fresh empty collection and sentinel-based unique keys.
    pub fn new(store: CacheStore<CacheKey<K>, V>, key_maker: impl CacheKeyMaker<K, V>) -> Self {
        Self {
            collection: Arc::new(ConcurrentIndexedSet::new()),
            store,
            key_maker: Arc::new(key_maker),
            unique_keys: Arc::new(SentinelKeyMaker),
        }
    }

    /// Uses an existing collection instead of a fresh one.
    pub fn with_collection(mut self, collection: Arc<ConcurrentIndexedSet<V>>) -> Self {
        self.collection = collection;
        self
    }

    /// Replaces the sentinel strategy with a domain-specific unique-key
    /// maker.
    pub fn with_unique_key_maker(mut self, unique_keys: impl UniqueKeyMaker<K>) -> Self {
        self.unique_keys = Arc::new(unique_keys);
        self
    }

    /// Wires everything together and spawns the background tasks.
    ///
    /// Registers the reverse-sync listener with the store exactly once,
    /// then starts the listener task and the maintenance actor.
    pub fn start(mut self) -> IndexedCache<K, V> {
        let events = self.store.register_listener();
        let store: SharedCacheStore<K, V> = Arc::new(RwLock::new(self.store));

        let listener = spawn_reverse_sync_listener(Arc::clone(&self.collection), events);

        let (tasks, task_rx) = mpsc::unbounded_channel();
        let actor = spawn_maintenance_actor(
            Arc::clone(&store),
            self.key_maker,
            self.unique_keys,
            task_rx,
        );

        info!("Indexed cache started");

        IndexedCache {
            collection: self.collection,
            store,
            tasks,
            actor,
            listener,
        }
    }
}

// == Indexed Cache ==
/// An indexed collection married to a cache store: predicate queries over
/// the collection, expiry/eviction/statistics from the store, with both
/// sides kept eventually consistent in the background.
pub struct IndexedCache<K, V> {
    collection: Arc<ConcurrentIndexedSet<V>>,
    store: SharedCacheStore<K, V>,
    tasks: mpsc::UnboundedSender<MaintenanceTask<V>>,
    actor: JoinHandle<()>,
    listener: JoinHandle<()>,
}

impl<K, V> IndexedCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Eq + Hash + Clone + Send + Sync + 'static,
{
    fn submit(&self, task: MaintenanceTask<V>) {
        if self.tasks.send(task).is_err() {
            warn!("Maintenance actor is gone; dropping maintenance task");
        }
    }

    // == Retrieve ==
    /// Queries the collection synchronously and returns the matching values.
    ///
    /// A non-empty result queues one hit registration per value; an empty
    /// result queues exactly one miss registration. Neither delays the
    /// result.
    pub async fn retrieve<P>(&self, predicate: P) -> Vec<V>
    where
        P: Fn(&V) -> bool,
    {
        let result = self.collection.retrieve(predicate).await;

        if result.is_empty() {
            self.submit(MaintenanceTask::RegisterMiss);
        } else {
            self.submit(MaintenanceTask::RegisterHits(result.clone()));
        }

        result
    }

    // == Add ==
    /// Inserts a value. Queues store propagation only if the collection
    /// actually changed.
    pub async fn add(&self, value: V) -> bool {
        let added = self.collection.add(value.clone()).await;
        if added {
            self.submit(MaintenanceTask::Added(value));
        }
        added
    }

    // == Remove ==
    /// Removes a value. Queues store propagation only if the collection
    /// actually changed.
    pub async fn remove(&self, value: &V) -> bool {
        let removed = self.collection.remove(value).await;
        if removed {
            self.submit(MaintenanceTask::Removed(value.clone()));
        }
        removed
    }

    // == Update ==
    /// Atomically replaces one batch of values with another.
    ///
    /// If anything changed, queues a reconcile that applies the removals to
    /// the store strictly before the additions, so a key reused across the
    /// two batches ends up bound to its new value.
    pub async fn update(&self, removed: Vec<V>, added: Vec<V>) -> bool {
        let changed = self.collection.update(&removed, &added).await;
        if changed {
            self.submit(MaintenanceTask::Reconcile { removed, added });
        }
        changed
    }

    // == Clear ==
    /// Clears both stores. Clearing the cache store also resets its
    /// statistics counters.
    pub async fn clear(&self) {
        self.collection.clear().await;
        self.store.write().await.clear();
    }

    // == Unsupported Bulk Operations ==
    /// Predicate-based bulk removal cannot be expressed as a deterministic
    /// removed/added diff against the store; always rejected.
    pub fn remove_if<P>(&self, _predicate: P) -> Result<bool>
    where
        P: Fn(&V) -> bool,
    {
        Err(CacheError::UnsupportedOperation(
            "remove_if is not supported on an indexed cache".to_string(),
        ))
    }

    /// See [`IndexedCache::remove_if`]; rejected for the same reason.
    pub fn retain_all(&self, _values: &[V]) -> Result<bool> {
        Err(CacheError::UnsupportedOperation(
            "retain_all is not supported on an indexed cache".to_string(),
        ))
    }

    // == Read Passthroughs ==
    /// Number of values in the collection.
    pub async fn len(&self) -> usize {
        self.collection.len().await
    }

    /// Whether the collection is empty.
    pub async fn is_empty(&self) -> bool {
        self.collection.is_empty().await
    }

    /// Whether an equal value is a member of the collection.
    pub async fn contains(&self, value: &V) -> bool {
        self.collection.contains(value).await
    }

    /// Snapshot of all values, in no particular order.
    pub async fn values(&self) -> Vec<V> {
        self.collection.values().await
    }

    // == Store Access ==
    /// The underlying cache store, shared. Mutating it directly is safe:
    /// the reverse-sync listener mirrors any change back into the
    /// collection.
    pub fn store(&self) -> SharedCacheStore<K, V> {
        Arc::clone(&self.store)
    }

    /// Point-in-time statistics snapshot from the cache store.
    pub async fn stats(&self) -> StatsSnapshot {
        self.store.read().await.stats()
    }

    /// Shared statistics handle, readable without locking the store.
    pub async fn stats_handle(&self) -> Arc<CacheStats> {
        self.store.read().await.stats_handle()
    }

    // == Shutdown ==
    /// Closes the store and winds down both background tasks.
    ///
    /// The maintenance actor drains its remaining queue (tasks fail softly
    /// against the closed store); the listener stops once the store's event
    /// channel drops.
    pub async fn shutdown(self) {
        self.store.write().await.close();
        drop(self.tasks);

        if let Err(err) = self.actor.await {
            warn!("Maintenance actor ended abnormally: {err}");
        }
        if let Err(err) = self.listener.await {
            warn!("Reverse-sync listener ended abnormally: {err}");
        }

        info!("Indexed cache shut down");
    }
}
