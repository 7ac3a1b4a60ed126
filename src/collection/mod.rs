//! Indexed Collection Module
//!
//! Provides the queryable side of the indexed cache: a concurrent,
//! set-semantic collection of values with predicate retrieval.

mod set;

pub use set::ConcurrentIndexedSet;
