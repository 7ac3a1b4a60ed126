//! Reverse-Sync Listener Module
//!
//! Mirrors cache-store-originated changes - external puts and removes,
//! capacity evictions, TTL expirations - back into the indexed collection.
//! Delivery is at-least-once and unordered relative to facade writes, so
//! every handler below is idempotent: the collection's set semantics absorb
//! duplicate notifications, including the echoes of the facade's own
//! maintenance puts.

use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::cache::CacheEvent;
use crate::collection::ConcurrentIndexedSet;

/// Spawns the listener task draining the store's change events into the
/// collection. The task ends when the store drops its event sender.
pub(crate) fn spawn_reverse_sync_listener<V>(
    collection: Arc<ConcurrentIndexedSet<V>>,
    mut events: mpsc::UnboundedReceiver<CacheEvent<V>>,
) -> JoinHandle<()>
where
    V: Eq + Hash + Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        debug!("Reverse-sync listener started");

        while let Some(event) = events.recv().await {
            trace!("Mirroring {} event into the collection", event.kind());
            match event {
                CacheEvent::Created(value) => {
                    collection.add(value).await;
                }
                CacheEvent::Updated { old, new } => {
                    collection.update(&[old], &[new]).await;
                }
                CacheEvent::Removed(value) | CacheEvent::Expired(value) => {
                    collection.remove(&value).await;
                }
            }
        }

        debug!("Reverse-sync listener stopped");
    })
}
