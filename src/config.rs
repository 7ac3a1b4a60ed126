//! Configuration Module
//!
//! Handles loading and managing cache store configuration from environment variables.

use std::env;

/// Cache store configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache store can hold
    pub max_entries: usize,
    /// Default TTL in seconds for entries without explicit TTL (None = no expiry)
    pub default_ttl_secs: Option<u64>,
    /// Background expiry sweep interval in seconds
    pub cleanup_interval_secs: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache store entries (default: 1000)
    /// - `DEFAULT_TTL_SECS` - Default TTL in seconds, 0 disables expiry (default: 0)
    /// - `CLEANUP_INTERVAL_SECS` - Expiry sweep frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        Self {
            max_entries: env::var("MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            default_ttl_secs: env::var("DEFAULT_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&ttl| ttl > 0),
            cleanup_interval_secs: env::var("CLEANUP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            default_ttl_secs: None,
            cleanup_interval_secs: 1,
        }
    }
}
