//! Cache Change Events Module
//!
//! Change notifications emitted by the cache store whenever its contents
//! mutate, whether through the synchronization facade or independently of it
//! (external put/remove, capacity eviction, TTL expiry).
//!
//! Delivery is asynchronous and at-least-once from the consumer's point of
//! view; handlers are expected to be idempotent.

// == Cache Event ==
/// A single change that happened inside the cache store.
///
/// `Updated` always carries the prior value so that a key derived from the
/// old value can be retired along with it.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEvent<V> {
    /// A binding was created for a previously absent key
    Created(V),
    /// An existing binding was replaced
    Updated { old: V, new: V },
    /// A binding was removed (explicit remove or capacity eviction)
    Removed(V),
    /// A binding was removed because its TTL elapsed
    Expired(V),
}

impl<V> CacheEvent<V> {
    /// Short name of the event kind, for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            CacheEvent::Created(_) => "created",
            CacheEvent::Updated { .. } => "updated",
            CacheEvent::Removed(_) => "removed",
            CacheEvent::Expired(_) => "expired",
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_names() {
        assert_eq!(CacheEvent::Created(1).kind(), "created");
        assert_eq!(CacheEvent::Updated { old: 1, new: 2 }.kind(), "updated");
        assert_eq!(CacheEvent::Removed(1).kind(), "removed");
        assert_eq!(CacheEvent::Expired(1).kind(), "expired");
    }
}
