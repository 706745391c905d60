//! Cache Store Module
//!
//! Main cache engine combining the entry table with eviction tracking, TTL
//! expiration and memory accounting.

use std::time::{Duration, Instant};

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::cache::{
    utf16_bytes, CacheEntry, CacheStats, EvictionTracker, GlobPattern, JsonSizeEstimator,
    SizeEstimator, StatsSnapshot, ENTRY_OVERHEAD_BYTES, UNESTIMABLE_VALUE_BYTES,
};
use crate::config::CacheConfig;
use crate::error::Result;

// == Cache Store ==
/// Bounded key-value storage with TTL expiration and LRU/FIFO eviction.
///
/// Every operation is synchronous. Reads take `&mut self` because they
/// reclaim expired entries, refresh recency and update hit/miss counters.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage, kept in insertion order
    entries: IndexMap<String, CacheEntry<V>>,
    /// Victim selection state
    tracker: EvictionTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Running sum of every entry's `size_bytes`
    memory_usage: usize,
    estimator: Box<dyn SizeEstimator<V>>,
    config: CacheConfig,
}

impl<V: Serialize> CacheStore<V> {
    // == Constructor ==
    /// Creates a store that sizes values by their JSON serialization.
    ///
    /// Fails if the configuration is invalid.
    pub fn new(config: CacheConfig) -> Result<Self> {
        Self::with_estimator(config, JsonSizeEstimator)
    }
}

impl<V> CacheStore<V> {
    /// Creates a store with a custom value size estimator.
    pub fn with_estimator<E>(config: CacheConfig, estimator: E) -> Result<Self>
    where
        E: SizeEstimator<V> + 'static,
    {
        config.validate()?;

        Ok(Self {
            entries: IndexMap::new(),
            tracker: EvictionTracker::new(config.eviction_policy),
            stats: CacheStats::new(),
            memory_usage: 0,
            estimator: Box::new(estimator),
            config,
        })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Set ==
    /// Stores a key-value pair.
    ///
    /// If the key already exists, the value is overwritten and its TTL reset.
    /// Inserting a new key into a full table evicts one entry first. After the
    /// insert, entries are evicted until the memory estimate fits the budget;
    /// a lone entry larger than the budget is kept.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl` - TTL for this entry (`default_ttl` if None); `Duration::ZERO` never expires
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let key = key.into();

        if !self.entries.contains_key(&key) && self.entries.len() >= self.config.max_entries {
            self.evict_one();
        }

        let ttl = ttl.unwrap_or(self.config.default_ttl);
        let size_bytes = self.entry_size(&key, &value);
        let entry = CacheEntry::new(value, ttl, size_bytes);

        // Overwrites keep the key's table position
        if let Some(previous) = self.entries.insert(key.clone(), entry) {
            self.memory_usage -= previous.size_bytes;
        }
        self.memory_usage += size_bytes;
        self.tracker.touch(&key);

        while self.memory_usage > self.config.max_memory_bytes && self.entries.len() > 1 {
            if !self.evict_one() {
                break;
            }
        }
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns the value if found and not expired. Expired entries are
    /// removed and counted as misses.
    pub fn get(&mut self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        let now = Instant::now();

        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired_at(now),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            debug!(key, "reclaiming expired entry on read");
            self.remove_entry(key);
            self.stats.record_miss();
            return None;
        }

        let entry = self.entries.get_mut(key)?;
        entry.mark_accessed(now);
        let value = entry.value.clone();
        self.tracker.touch(key);
        self.stats.record_hit();
        Some(value)
    }

    // == Has ==
    /// Returns true if `get(key)` would return a value.
    ///
    /// This is not a side-effect-free membership check: it reclaims an
    /// expired entry, counts a hit or miss and refreshes LRU recency exactly
    /// as `get` does.
    pub fn has(&mut self, key: &str) -> bool
    where
        V: Clone,
    {
        self.get(key).is_some()
    }

    // == Delete ==
    /// Removes an entry by key.
    ///
    /// Returns true if an entry was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.remove_entry(key).is_some()
    }

    // == Clear ==
    /// Removes every entry and resets all statistics.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.tracker.clear();
        self.stats.reset();
        self.memory_usage = 0;
    }

    // == Keys ==
    /// Returns keys in table order, optionally filtered by a glob pattern.
    ///
    /// Expired entries that have not been reclaimed yet are still listed.
    pub fn keys(&self, pattern: Option<&str>) -> Vec<String> {
        match pattern {
            None => self.entries.keys().cloned().collect(),
            Some(pattern) => match GlobPattern::new(pattern) {
                Some(glob) => self
                    .entries
                    .keys()
                    .filter(|key| glob.matches(key))
                    .cloned()
                    .collect(),
                None => Vec::new(),
            },
        }
    }

    // == Size ==
    /// Returns the raw number of entries in the table.
    ///
    /// Expired entries count until a read or sweep reclaims them.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot {
            size: self.entries.len(),
            max_entries: self.config.max_entries,
            hits: self.stats.hits,
            misses: self.stats.misses,
            hit_rate: self.stats.hit_rate(),
            memory_usage_bytes: self.memory_usage,
            evictions: self.stats.evictions,
        }
    }

    // == Estimate Memory Usage ==
    /// Returns the estimated footprint of every entry in the table.
    pub fn estimate_memory_usage(&self) -> usize {
        self.memory_usage
    }

    // == Cleanup ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed. Hit, miss and eviction counters
    /// are left untouched.
    pub fn cleanup(&mut self) -> usize {
        let now = Instant::now();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.remove_entry(key);
        }

        expired_keys.len()
    }

    // == Internals ==
    /// Removes an entry from the table and the order index together.
    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let entry = self.entries.shift_remove(key)?;
        self.tracker.remove(key);
        self.memory_usage -= entry.size_bytes;
        Some(entry)
    }

    /// Evicts one victim. Returns false if there was nothing to evict.
    fn evict_one(&mut self) -> bool {
        let Some(victim) = self.tracker.select_victim(&self.entries) else {
            return false;
        };

        if self.remove_entry(&victim).is_none() {
            return false;
        }
        self.stats.record_eviction();
        debug!(key = %victim, policy = %self.tracker.policy(), "evicted entry");
        true
    }

    fn entry_size(&self, key: &str, value: &V) -> usize {
        let value_bytes = self.estimator.estimate(value).unwrap_or_else(|| {
            debug!(key, "value size not estimable, charging fallback");
            UNESTIMABLE_VALUE_BYTES
        });
        utf16_bytes(key) + value_bytes + ENTRY_OVERHEAD_BYTES
    }
}
