//! Maintenance Actor Module
//!
//! A single-worker background task that executes every cache-store side
//! effect triggered by collection-side operations, strictly in submission
//! order. One worker and one in-flight task is deliberate: remove-before-add
//! orderings are only meaningful if tasks never run concurrently or out of
//! order.

use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::error::{CacheError, Result};
use crate::sync::key::{CacheKey, CacheKeyMaker, UniqueKeyMaker};
use crate::sync::SharedCacheStore;

// == Maintenance Task ==
/// One unit of deferred cache-store work, queued FIFO.
#[derive(Debug, Clone)]
pub enum MaintenanceTask<V> {
    /// Touch the store once per retrieved value so its hit counter advances
    RegisterHits(Vec<V>),
    /// Look up a synthesized key to advance the miss counter by exactly one
    RegisterMiss,
    /// Mirror a batched collection update: removals strictly before additions
    Reconcile { removed: Vec<V>, added: Vec<V> },
    /// Mirror a single collection insert
    Added(V),
    /// Mirror a single collection removal
    Removed(V),
}

// == Actor ==
/// Spawns the maintenance worker draining the task queue.
///
/// A task that fails because the store was torn down is logged and dropped;
/// it never poisons later tasks and never reaches the caller that queued it.
/// A miss-registration inconsistency is a broken statistics contract and
/// panics the worker instead of being swallowed.
pub(crate) fn spawn_maintenance_actor<K, V>(
    store: SharedCacheStore<K, V>,
    key_maker: Arc<dyn CacheKeyMaker<K, V>>,
    unique_keys: Arc<dyn UniqueKeyMaker<K>>,
    mut tasks: mpsc::UnboundedReceiver<MaintenanceTask<V>>,
) -> JoinHandle<()>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + PartialEq + Send + Sync + 'static,
{
    tokio::spawn(async move {
        debug!("Maintenance actor started");

        while let Some(task) = tasks.recv().await {
            let outcome = apply_task(&store, key_maker.as_ref(), unique_keys.as_ref(), task).await;

            if let Err(err) = outcome {
                match err {
                    CacheError::StoreUnavailable => {
                        debug!("Skipping maintenance task: cache store is closed");
                    }
                    CacheError::MissInconsistency(msg) => {
                        error!("Miss registration inconsistency: {msg}");
                        panic!("miss registration inconsistency: {msg}");
                    }
                    other => {
                        warn!("Maintenance task failed: {other}");
                    }
                }
            }
        }

        debug!("Maintenance actor stopped");
    })
}

async fn apply_task<K, V>(
    store: &SharedCacheStore<K, V>,
    key_maker: &dyn CacheKeyMaker<K, V>,
    unique_keys: &dyn UniqueKeyMaker<K>,
    task: MaintenanceTask<V>,
) -> Result<()>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + PartialEq + Send + Sync + 'static,
{
    match task {
        MaintenanceTask::RegisterHits(values) => {
            let mut store = store.write().await;
            for value in &values {
                let key = CacheKey::real(key_maker.make_key(value));
                // The returned value is discarded; the lookup exists only to
                // advance the store's hit counter.
                let _ = store.get(&key)?;
            }
        }

        MaintenanceTask::RegisterMiss => {
            let key = unique_keys.make_unique_key()?;
            let mut store = store.write().await;
            if store.get(&key)?.is_some() {
                return Err(CacheError::MissInconsistency(
                    "synthesized key resolved to a live binding".to_string(),
                ));
            }
        }

        MaintenanceTask::Reconcile { removed, added } => {
            let mut store = store.write().await;
            // Removals first, so a key reused across the two batches ends up
            // bound to its new value
            for value in &removed {
                let key = CacheKey::real(key_maker.make_key(value));
                store.remove_if_value(&key, value)?;
            }
            for value in added {
                let key = CacheKey::real(key_maker.make_key(&value));
                store.put(key, value, None)?;
            }
        }

        MaintenanceTask::Added(value) => {
            let key = CacheKey::real(key_maker.make_key(&value));
            store.write().await.put(key, value, None)?;
        }

        MaintenanceTask::Removed(value) => {
            let key = CacheKey::real(key_maker.make_key(&value));
            store.write().await.remove(&key)?;
        }
    }

    Ok(())
}
