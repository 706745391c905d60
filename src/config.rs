//! Configuration Module
//!
//! Cache parameters plus the server settings loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{ttl_from_millis, EvictionPolicy};
use crate::error::{CacheError, Result};

/// Default maximum number of entries
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// Default memory budget (100 MiB)
pub const DEFAULT_MAX_MEMORY_BYTES: usize = 100 * 1024 * 1024;

/// Default TTL applied when `set` is called without one (1 hour)
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Default interval between background sweeps (5 minutes)
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);

// == Cache Config ==
/// Parameters fixed for the lifetime of one cache instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// Upper bound on the estimated memory footprint
    pub max_memory_bytes: usize,
    /// TTL used when `set` is called without one; zero means never expire
    pub default_ttl: Duration,
    /// Interval between background sweeps
    pub cleanup_interval: Duration,
    /// Victim selection rule
    pub eviction_policy: EvictionPolicy,
}

impl CacheConfig {
    /// Rejects configurations the cache cannot operate under.
    pub fn validate(&self) -> Result<()> {
        if self.max_entries == 0 {
            return Err(CacheError::InvalidConfig(
                "max_entries must be greater than zero".to_string(),
            ));
        }
        if self.max_memory_bytes == 0 {
            return Err(CacheError::InvalidConfig(
                "max_memory_bytes must be greater than zero".to_string(),
            ));
        }
        if self.cleanup_interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "cleanup_interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn with_max_memory_bytes(mut self, max_memory_bytes: usize) -> Self {
        self.max_memory_bytes = max_memory_bytes;
        self
    }

    pub fn with_default_ttl(mut self, default_ttl: Duration) -> Self {
        self.default_ttl = default_ttl;
        self
    }

    pub fn with_cleanup_interval(mut self, cleanup_interval: Duration) -> Self {
        self.cleanup_interval = cleanup_interval;
        self
    }

    pub fn with_eviction_policy(mut self, eviction_policy: EvictionPolicy) -> Self {
        self.eviction_policy = eviction_policy;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            max_memory_bytes: DEFAULT_MAX_MEMORY_BYTES,
            default_ttl: DEFAULT_TTL,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
            eviction_policy: EvictionPolicy::default(),
        }
    }
}

// == Server Config ==
/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Parameters for the underlying cache store
    pub cache: CacheConfig,
    /// HTTP server port
    pub server_port: u16,
    /// Prefix applied to every key handled by the server
    pub key_prefix: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `MAX_MEMORY_BYTES` - Memory budget in bytes (default: 100 MiB)
    /// - `DEFAULT_TTL_MS` - Default TTL in milliseconds, `<= 0` never expires (default: 1 hour)
    /// - `CLEANUP_INTERVAL_MS` - Sweep frequency in milliseconds (default: 5 minutes)
    /// - `EVICTION_POLICY` - `lru` or `fifo` (default: lru)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `KEY_PREFIX` - Namespace prepended to keys (default: empty)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable source.
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = CacheConfig::default();

        let cache = CacheConfig {
            max_entries: parse_var(&lookup, "MAX_ENTRIES").unwrap_or(defaults.max_entries),
            max_memory_bytes: parse_var(&lookup, "MAX_MEMORY_BYTES")
                .unwrap_or(defaults.max_memory_bytes),
            default_ttl: parse_var(&lookup, "DEFAULT_TTL_MS")
                .map(ttl_from_millis)
                .unwrap_or(defaults.default_ttl),
            cleanup_interval: parse_var(&lookup, "CLEANUP_INTERVAL_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.cleanup_interval),
            eviction_policy: parse_var(&lookup, "EVICTION_POLICY")
                .unwrap_or(defaults.eviction_policy),
        };

        Self {
            cache,
            server_port: parse_var(&lookup, "SERVER_PORT").unwrap_or(3000),
            key_prefix: lookup("KEY_PREFIX").unwrap_or_default(),
        }
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(name).and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            server_port: 3000,
            key_prefix: String::new(),
        }
    }
}
