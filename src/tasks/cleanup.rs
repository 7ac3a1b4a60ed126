//! TTL Cleanup Task
//!
//! Background task that periodically sweeps expired cache store entries.
//! Each swept entry is announced as an `Expired` event, so a registered
//! reverse-sync listener drops the matching value from the collection.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a background task that periodically cleans up expired cache store
/// entries.
///
/// The task sleeps for the configured interval between sweeps and stops on
/// its own once the store is closed. The returned JoinHandle can also be
/// used to abort it early.
pub fn spawn_cleanup_task<K, V>(
    cache: Arc<RwLock<CacheStore<K, V>>>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + PartialEq + Send + Sync + 'static,
{
    let interval = Duration::from_secs(cleanup_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut cache_guard = cache.write().await;
                if cache_guard.is_closed() {
                    debug!("Cache store closed; stopping TTL cleanup task");
                    break;
                }
                cache_guard.cleanup_expired()
            };

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}
