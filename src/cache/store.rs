//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU tracking, TTL
//! expiration, shared statistics and change-event emission.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use crate::cache::{CacheEntry, CacheEvent, CacheStats, LruTracker, StatsSnapshot};
use crate::config::Config;
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Key-value store with LRU eviction, TTL support, hit/miss statistics and
/// change notifications.
///
/// Every mutation that happens here - including evictions and expirations
/// the caller never asked for - is reported on the registered event channel,
/// so an external observer can mirror this store's contents.
#[derive(Debug)]
pub struct CacheStore<K, V> {
    /// Key-value storage
    entries: HashMap<K, CacheEntry<V>>,
    /// LRU access tracker
    lru: LruTracker<K>,
    /// Shared performance counters
    stats: Arc<CacheStats>,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// Default TTL for entries without explicit TTL (None = no expiry)
    default_ttl: Option<Duration>,
    /// Once closed, all lookups and mutations fail with StoreUnavailable
    closed: bool,
    /// Change-event channel, installed by the listener registration
    events: Option<mpsc::UnboundedSender<CacheEvent<V>>>,
}

impl<K, V> CacheStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + PartialEq,
{
    // == Constructor ==
    /// Creates a new CacheStore with specified capacity and default TTL.
    pub fn new(max_entries: usize, default_ttl: Option<Duration>) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: Arc::new(CacheStats::new()),
            max_entries,
            default_ttl,
            closed: false,
            events: None,
        }
    }

    /// Creates a new CacheStore from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.max_entries,
            config.default_ttl_secs.map(Duration::from_secs),
        )
    }

    // == Listener Registration ==
    /// Installs the change-notification channel and returns its receiving
    /// end. A store supports a single listener; registering again replaces
    /// the previous channel.
    pub fn register_listener(&mut self) -> mpsc::UnboundedReceiver<CacheEvent<V>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(tx);
        rx
    }

    fn emit(&self, event: CacheEvent<V>) {
        if let Some(tx) = &self.events {
            // A dropped receiver just means nobody is mirroring anymore.
            let _ = tx.send(event);
        }
    }

    // == Get ==
    /// Retrieves a value by key, recording a hit or a miss.
    ///
    /// Returns `Ok(None)` when the key is absent or its entry has expired;
    /// an expired entry is removed, counted as both a miss and an
    /// expiration, and announced with an `Expired` event.
    pub fn get(&mut self, key: &K) -> Result<Option<V>> {
        if self.closed {
            return Err(CacheError::StoreUnavailable);
        }

        match self.entries.get(key) {
            Some(entry) if entry.is_expired() => {
                let value = entry.value.clone();
                self.entries.remove(key);
                self.lru.remove(key);
                self.stats.record_miss();
                self.stats.record_expiration();
                self.emit(CacheEvent::Expired(value));
                Ok(None)
            }
            Some(entry) => {
                let value = entry.value.clone();
                self.stats.record_hit();
                self.lru.touch(key);
                Ok(Some(value))
            }
            None => {
                self.stats.record_miss();
                Ok(None)
            }
        }
    }

    // == Put ==
    /// Stores a key-value binding with optional TTL.
    ///
    /// Replacing an existing binding emits `Updated` with the prior value.
    /// A fresh insert at capacity evicts the least recently used binding
    /// first (counted and announced as `Removed`) and then emits `Created`.
    pub fn put(&mut self, key: K, value: V, ttl: Option<Duration>) -> Result<()> {
        if self.closed {
            return Err(CacheError::StoreUnavailable);
        }

        let effective_ttl = ttl.or(self.default_ttl);

        if let Some(existing) = self.entries.get(&key) {
            let old = existing.value.clone();
            self.entries
                .insert(key.clone(), CacheEntry::new(value.clone(), effective_ttl));
            self.lru.touch(&key);
            self.emit(CacheEvent::Updated { old, new: value });
            return Ok(());
        }

        // Fresh key; evict the oldest binding if at capacity
        if self.entries.len() >= self.max_entries {
            match self.lru.evict_oldest() {
                Some(evicted_key) => {
                    if let Some(evicted) = self.entries.remove(&evicted_key) {
                        self.stats.record_eviction();
                        debug!("evicted least recently used entry at capacity");
                        self.emit(CacheEvent::Removed(evicted.value));
                    }
                }
                None => {
                    return Err(CacheError::CacheFull(
                        "store is at capacity and has nothing to evict".to_string(),
                    ));
                }
            }
        }

        self.entries
            .insert(key.clone(), CacheEntry::new(value.clone(), effective_ttl));
        self.lru.touch(&key);
        self.emit(CacheEvent::Created(value));

        Ok(())
    }

    // == Remove ==
    /// Removes a binding by key. Returns whether a binding was removed.
    pub fn remove(&mut self, key: &K) -> Result<bool> {
        if self.closed {
            return Err(CacheError::StoreUnavailable);
        }

        match self.entries.remove(key) {
            Some(entry) => {
                self.lru.remove(key);
                self.emit(CacheEvent::Removed(entry.value));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // == Remove If Value ==
    /// Removes a binding only if it is currently bound to the given value.
    ///
    /// Used during reconciliation so that a key rebound to a newer value is
    /// not torn down by a stale removal.
    pub fn remove_if_value(&mut self, key: &K, value: &V) -> Result<bool> {
        if self.closed {
            return Err(CacheError::StoreUnavailable);
        }

        let matches = self
            .entries
            .get(key)
            .map(|entry| &entry.value == value)
            .unwrap_or(false);

        if matches {
            self.remove(key)
        } else {
            Ok(false)
        }
    }

    // == Contains Key ==
    /// Returns whether a live (non-expired) binding exists for the key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries
            .get(key)
            .map(|entry| !entry.is_expired())
            .unwrap_or(false)
    }

    // == Clear ==
    /// Drops all bindings and resets the statistics counters.
    ///
    /// Emits no events; a caller clearing the store is expected to clear
    /// whatever mirrors it in the same breath.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.stats.reset();
    }

    // == Close ==
    /// Marks the store closed. Subsequent lookups and mutations fail with
    /// `StoreUnavailable` and the event channel is dropped so any listener
    /// drains and stops.
    pub fn close(&mut self) {
        self.closed = true;
        self.events = None;
    }

    /// Returns whether the store has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    // == Stats ==
    /// Returns a point-in-time snapshot of the statistics counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot(self.entries.len())
    }

    /// Returns the shared statistics handle. The handle stays valid and
    /// readable without locking the store.
    pub fn stats_handle(&self) -> Arc<CacheStats> {
        Arc::clone(&self.stats)
    }

    // == Cleanup Expired ==
    /// Removes all expired bindings, announcing each as `Expired`.
    ///
    /// Returns the number of bindings removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let expired_keys: Vec<K> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();

        for key in expired_keys {
            if let Some(entry) = self.entries.remove(&key) {
                self.lru.remove(&key);
                self.stats.record_expiration();
                self.emit(CacheEvent::Expired(entry.value));
            }
        }

        count
    }

    // == Length ==
    /// Returns the current number of bindings in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no bindings.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn store() -> CacheStore<String, String> {
        CacheStore::new(100, None)
    }

    #[test]
    fn test_store_new() {
        let store = store();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert!(!store.is_closed());
    }

    #[test]
    fn test_store_put_and_get() {
        let mut store = store();

        store.put("key1".to_string(), "value1".to_string(), None).unwrap();
        let value = store.get(&"key1".to_string()).unwrap();

        assert_eq!(value, Some("value1".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = store();

        let result = store.get(&"nonexistent".to_string()).unwrap();
        assert_eq!(result, None);
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_store_remove() {
        let mut store = store();

        store.put("key1".to_string(), "value1".to_string(), None).unwrap();
        assert!(store.remove(&"key1".to_string()).unwrap());

        assert!(store.is_empty());
        assert_eq!(store.get(&"key1".to_string()).unwrap(), None);
    }

    #[test]
    fn test_store_remove_nonexistent() {
        let mut store = store();
        assert!(!store.remove(&"nonexistent".to_string()).unwrap());
    }

    #[test]
    fn test_store_remove_if_value() {
        let mut store = store();

        store.put("key1".to_string(), "value1".to_string(), None).unwrap();

        // Wrong value: binding survives
        assert!(!store
            .remove_if_value(&"key1".to_string(), &"other".to_string())
            .unwrap());
        assert_eq!(store.len(), 1);

        // Matching value: binding removed
        assert!(store
            .remove_if_value(&"key1".to_string(), &"value1".to_string())
            .unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = store();

        store.put("key1".to_string(), "value1".to_string(), None).unwrap();
        store.put("key1".to_string(), "value2".to_string(), None).unwrap();

        let value = store.get(&"key1".to_string()).unwrap();
        assert_eq!(value, Some("value2".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_ttl_expiration() {
        let mut store = store();

        store
            .put(
                "key1".to_string(),
                "value1".to_string(),
                Some(Duration::from_millis(50)),
            )
            .unwrap();

        assert!(store.get(&"key1".to_string()).unwrap().is_some());

        sleep(Duration::from_millis(80));

        assert_eq!(store.get(&"key1".to_string()).unwrap(), None);
        assert_eq!(store.stats().expirations, 1);
    }

    #[test]
    fn test_store_lru_eviction() {
        let mut store: CacheStore<String, String> = CacheStore::new(3, None);

        store.put("key1".to_string(), "value1".to_string(), None).unwrap();
        store.put("key2".to_string(), "value2".to_string(), None).unwrap();
        store.put("key3".to_string(), "value3".to_string(), None).unwrap();

        // Cache is full, adding key4 should evict key1 (oldest)
        store.put("key4".to_string(), "value4".to_string(), None).unwrap();

        assert_eq!(store.len(), 3);
        assert!(!store.contains_key(&"key1".to_string()));
        assert!(store.contains_key(&"key2".to_string()));
        assert!(store.contains_key(&"key3".to_string()));
        assert!(store.contains_key(&"key4".to_string()));
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_store_lru_touch_on_get() {
        let mut store: CacheStore<String, String> = CacheStore::new(3, None);

        store.put("key1".to_string(), "value1".to_string(), None).unwrap();
        store.put("key2".to_string(), "value2".to_string(), None).unwrap();
        store.put("key3".to_string(), "value3".to_string(), None).unwrap();

        // Access key1 to make it most recently used
        store.get(&"key1".to_string()).unwrap();

        // Adding key4 should evict key2 (now oldest)
        store.put("key4".to_string(), "value4".to_string(), None).unwrap();

        assert!(store.contains_key(&"key1".to_string()));
        assert!(!store.contains_key(&"key2".to_string()));
    }

    #[test]
    fn test_store_zero_capacity_is_full() {
        let mut store: CacheStore<String, String> = CacheStore::new(0, None);

        let result = store.put("key".to_string(), "value".to_string(), None);
        assert!(matches!(result, Err(CacheError::CacheFull(_))));
    }

    #[test]
    fn test_store_stats() {
        let mut store = store();

        store.put("key1".to_string(), "value1".to_string(), None).unwrap();
        store.get(&"key1".to_string()).unwrap(); // hit
        store.get(&"nonexistent".to_string()).unwrap(); // miss

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_store_clear_resets_stats() {
        let mut store = store();

        store.put("key1".to_string(), "value1".to_string(), None).unwrap();
        store.get(&"key1".to_string()).unwrap();
        store.get(&"missing".to_string()).unwrap();

        store.clear();

        let stats = store.stats();
        assert!(store.is_empty());
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn test_store_closed_rejects_operations() {
        let mut store = store();
        store.put("key1".to_string(), "value1".to_string(), None).unwrap();
        store.close();

        assert!(store.is_closed());
        assert!(matches!(
            store.get(&"key1".to_string()),
            Err(CacheError::StoreUnavailable)
        ));
        assert!(matches!(
            store.put("key2".to_string(), "value2".to_string(), None),
            Err(CacheError::StoreUnavailable)
        ));
        assert!(matches!(
            store.remove(&"key1".to_string()),
            Err(CacheError::StoreUnavailable)
        ));
    }

    #[test]
    fn test_store_cleanup_expired() {
        let mut store = store();

        store
            .put(
                "key1".to_string(),
                "value1".to_string(),
                Some(Duration::from_millis(30)),
            )
            .unwrap();
        store
            .put(
                "key2".to_string(),
                "value2".to_string(),
                Some(Duration::from_secs(10)),
            )
            .unwrap();

        sleep(Duration::from_millis(60));

        let removed = store.cleanup_expired();
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
        assert!(store.contains_key(&"key2".to_string()));
    }

    #[test]
    fn test_store_from_config() {
        let config = Config {
            max_entries: 2,
            default_ttl_secs: Some(60),
            cleanup_interval_secs: 1,
        };
        let mut store: CacheStore<String, String> = CacheStore::from_config(&config);

        store.put("key1".to_string(), "v1".to_string(), None).unwrap();
        store.put("key2".to_string(), "v2".to_string(), None).unwrap();
        store.put("key3".to_string(), "v3".to_string(), None).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_store_default_ttl_applied() {
        let mut store: CacheStore<String, String> =
            CacheStore::new(100, Some(Duration::from_millis(40)));

        store.put("key1".to_string(), "value1".to_string(), None).unwrap();
        sleep(Duration::from_millis(70));

        assert_eq!(store.get(&"key1".to_string()).unwrap(), None);
    }

    #[test]
    fn test_store_events_created_updated_removed() {
        let mut store = store();
        let mut events = store.register_listener();

        store.put("key1".to_string(), "v1".to_string(), None).unwrap();
        store.put("key1".to_string(), "v2".to_string(), None).unwrap();
        store.remove(&"key1".to_string()).unwrap();

        assert_eq!(events.try_recv().unwrap(), CacheEvent::Created("v1".to_string()));
        assert_eq!(
            events.try_recv().unwrap(),
            CacheEvent::Updated {
                old: "v1".to_string(),
                new: "v2".to_string()
            }
        );
        assert_eq!(events.try_recv().unwrap(), CacheEvent::Removed("v2".to_string()));
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_store_events_eviction_and_expiry() {
        let mut store: CacheStore<String, String> = CacheStore::new(1, None);
        let mut events = store.register_listener();

        store.put("key1".to_string(), "v1".to_string(), None).unwrap();
        store.put("key2".to_string(), "v2".to_string(), None).unwrap();

        assert_eq!(events.try_recv().unwrap(), CacheEvent::Created("v1".to_string()));
        // key1 pushed out at capacity
        assert_eq!(events.try_recv().unwrap(), CacheEvent::Removed("v1".to_string()));
        assert_eq!(events.try_recv().unwrap(), CacheEvent::Created("v2".to_string()));

        store
            .put(
                "key3".to_string(),
                "v3".to_string(),
                Some(Duration::from_millis(20)),
            )
            .unwrap();
        sleep(Duration::from_millis(50));
        store.cleanup_expired();

        // Skip key2 eviction and key3 creation to reach the expiry event
        assert_eq!(events.try_recv().unwrap(), CacheEvent::Removed("v2".to_string()));
        assert_eq!(events.try_recv().unwrap(), CacheEvent::Created("v3".to_string()));
        assert_eq!(events.try_recv().unwrap(), CacheEvent::Expired("v3".to_string()));
    }

    #[test]
    fn test_store_clear_emits_no_events() {
        let mut store = store();
        let mut events = store.register_listener();

        store.put("key1".to_string(), "v1".to_string(), None).unwrap();
        let _ = events.try_recv();

        store.clear();
        assert!(events.try_recv().is_err());
    }
}
