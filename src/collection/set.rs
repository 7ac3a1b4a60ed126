//! Concurrent Indexed Set Module
//!
//! The queryable side of the indexed cache: a thread-safe set of values with
//! predicate-based retrieval. Retrieval scans a snapshot of the set; index
//! structures and query planning are the concern of whatever predicate the
//! caller supplies.

use std::collections::HashSet;
use std::hash::Hash;

use tokio::sync::RwLock;

// == Concurrent Indexed Set ==
/// A set of values under value equality, safe for concurrent use from
/// caller tasks, maintenance effects and reverse-sync handlers.
///
/// Re-adding an equal value is a no-op; the set never holds two values
/// equal to each other.
#[derive(Debug, Default)]
pub struct ConcurrentIndexedSet<V> {
    values: RwLock<HashSet<V>>,
}

impl<V> ConcurrentIndexedSet<V>
where
    V: Eq + Hash + Clone,
{
    // == Constructor ==
    /// Creates a new empty set.
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashSet::new()),
        }
    }

    // == Retrieve ==
    /// Returns all values matching the predicate.
    pub async fn retrieve<P>(&self, predicate: P) -> Vec<V>
    where
        P: Fn(&V) -> bool,
    {
        let values = self.values.read().await;
        values.iter().filter(|v| predicate(v)).cloned().collect()
    }

    // == Add ==
    /// Inserts a value. Returns whether the set changed.
    pub async fn add(&self, value: V) -> bool {
        let mut values = self.values.write().await;
        values.insert(value)
    }

    // == Remove ==
    /// Removes a value. Returns whether the set changed.
    pub async fn remove(&self, value: &V) -> bool {
        let mut values = self.values.write().await;
        values.remove(value)
    }

    // == Update ==
    /// Atomically removes one batch of values and adds another, under a
    /// single write lock. Returns whether the set changed at all.
    pub async fn update(&self, removed: &[V], added: &[V]) -> bool {
        let mut values = self.values.write().await;
        let mut changed = false;

        for value in removed {
            changed |= values.remove(value);
        }
        for value in added {
            changed |= values.insert(value.clone());
        }

        changed
    }

    // == Clear ==
    /// Removes all values.
    pub async fn clear(&self) {
        let mut values = self.values.write().await;
        values.clear();
    }

    // == Contains ==
    /// Returns whether an equal value is a member.
    pub async fn contains(&self, value: &V) -> bool {
        let values = self.values.read().await;
        values.contains(value)
    }

    // == Length ==
    /// Returns the number of values held.
    pub async fn len(&self) -> usize {
        let values = self.values.read().await;
        values.len()
    }

    // == Is Empty ==
    pub async fn is_empty(&self) -> bool {
        let values = self.values.read().await;
        values.is_empty()
    }

    // == Values ==
    /// Returns a snapshot of all values, in no particular order.
    pub async fn values(&self) -> Vec<V> {
        let values = self.values.read().await;
        values.iter().cloned().collect()
    }
}
