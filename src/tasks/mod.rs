//! Background Tasks Module
//!
//! Contains background tasks that run alongside a live indexed cache.
//!
//! # Tasks
//! - TTL Cleanup: sweeps expired cache store entries at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
