//! Cache Key Module
//!
//! Key derivation for cache store bindings, plus synthesis of sentinel keys
//! that are guaranteed to miss.
//!
//! The store is keyed by [`CacheKey`], a tagged union of real derived keys
//! and sentinel keys. A sentinel carries a freshly drawn random token and by
//! construction never compares equal to any real key, so looking one up is a
//! deterministic miss. This replaces the runtime-subclassing tricks some
//! ecosystems use to forge never-equal instances.

use uuid::Uuid;

use crate::error::Result;

// == Cache Key Maker ==
/// A thing that makes cache keys for values.
///
/// Must be pure and deterministic: equal values always yield equal keys.
pub trait CacheKeyMaker<K, V>: Send + Sync + 'static {
    /// Returns the key for a value. A given value must always map to the
    /// same (equal) key.
    fn make_key(&self, value: &V) -> K;
}

/// A CacheKeyMaker whose keys are clones of their associated values.
///
/// Useful when the value type's equality and hash already identify the
/// entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityKeyMaker;

impl<V> CacheKeyMaker<V, V> for IdentityKeyMaker
where
    V: Clone + Send + Sync + 'static,
{
    fn make_key(&self, value: &V) -> V {
        value.clone()
    }
}

/// Adapts a plain closure into a CacheKeyMaker.
#[derive(Debug, Clone)]
pub struct FnKeyMaker<F>(pub F);

impl<K, V, F> CacheKeyMaker<K, V> for FnKeyMaker<F>
where
    F: Fn(&V) -> K + Send + Sync + 'static,
{
    fn make_key(&self, value: &V) -> K {
        (self.0)(value)
    }
}

// == Cache Key ==
/// A cache store key: either a real key derived from a value, or a sentinel
/// synthesized to never match anything.
///
/// The derived `Eq`/`Hash` give sentinels the required behaviour for free:
/// a `Sentinel` never equals a `Real`, two sentinels are equal only if their
/// 122-bit random tokens collide, and a sentinel's hash is drawn from its
/// token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey<K> {
    /// A key derived from a real value by a [`CacheKeyMaker`]
    Real(K),
    /// A synthesized key guaranteed to miss
    Sentinel(Uuid),
}

impl<K> CacheKey<K> {
    /// Wraps a derived key.
    pub fn real(key: K) -> Self {
        CacheKey::Real(key)
    }

    /// Returns whether this key is a sentinel.
    pub fn is_sentinel(&self) -> bool {
        matches!(self, CacheKey::Sentinel(_))
    }
}

// == Unique Key Maker ==
/// A thing that makes unique keys - keys that will always miss on a store
/// lookup.
///
/// The default [`SentinelKeyMaker`] is infallible; a domain-specific
/// strategy that cannot synthesize a key for some type should return
/// [`CacheError::KeySynthesisUnsupported`](crate::error::CacheError).
pub trait UniqueKeyMaker<K>: Send + Sync + 'static {
    /// Returns a key that no lookup can find. Repeated calls must never
    /// return mutually-equal keys.
    fn make_unique_key(&self) -> Result<CacheKey<K>>;
}

/// Makes sentinel keys carrying a fresh random token per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SentinelKeyMaker;

impl<K> UniqueKeyMaker<K> for SentinelKeyMaker
where
    K: Send + Sync + 'static,
{
    fn make_unique_key(&self) -> Result<CacheKey<K>> {
        Ok(CacheKey::Sentinel(Uuid::new_v4()))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::collections::HashSet;
    use std::hash::{Hash, Hasher};

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_identity_key_maker_clones_value() {
        let maker = IdentityKeyMaker;
        let key: String = maker.make_key(&"Frank".to_string());
        assert_eq!(key, "Frank");
    }

    #[test]
    fn test_fn_key_maker() {
        let maker = FnKeyMaker(|v: &String| v.len());
        assert_eq!(maker.make_key(&"Frank".to_string()), 5);
        assert_eq!(maker.make_key(&"Frank".to_string()), 5);
    }

    #[test]
    fn test_sentinel_never_equals_real() {
        let maker = SentinelKeyMaker;
        let sentinel: CacheKey<String> = maker.make_unique_key().unwrap();

        assert!(sentinel.is_sentinel());
        assert_ne!(sentinel, CacheKey::real("Frank".to_string()));
        assert_ne!(sentinel, CacheKey::real(String::new()));
    }

    #[test]
    fn test_successive_sentinels_never_equal() {
        let maker = SentinelKeyMaker;
        let a: CacheKey<String> = maker.make_unique_key().unwrap();
        let b: CacheKey<String> = maker.make_unique_key().unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn test_sentinel_uniqueness_large_sample() {
        let maker = SentinelKeyMaker;
        let mut seen_keys = HashSet::new();
        let mut seen_hashes = HashSet::new();

        for _ in 0..10_000 {
            let key: CacheKey<String> = maker.make_unique_key().unwrap();
            assert!(seen_hashes.insert(hash_of(&key)), "hash collision");
            assert!(seen_keys.insert(key), "equal sentinel pair");
        }
    }

    #[test]
    fn test_real_keys_compare_by_content() {
        let a = CacheKey::real("Frank".to_string());
        let b = CacheKey::real("Frank".to_string());
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }
}
