//! Error types for the indexed cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the indexed cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Operation the facade deliberately rejects (predicate-based bulk removal)
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// The configured unique-key strategy cannot synthesize a key for this type
    #[error("Key synthesis unsupported: {0}")]
    KeySynthesisUnsupported(String),

    /// A synthesized miss key was unexpectedly bound in the store
    #[error("Miss registration inconsistency: {0}")]
    MissInconsistency(String),

    /// Cache store has been closed or torn down
    #[error("Cache store is closed")]
    StoreUnavailable,

    /// Cache is full and eviction failed
    #[error("Cache full: {0}")]
    CacheFull(String),
}

// == Result Type Alias ==
/// Convenience Result type for the indexed cache.
pub type Result<T> = std::result::Result<T, CacheError>;
