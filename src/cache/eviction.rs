//! Eviction Tracker Module
//!
//! Picks the entry to evict under either the LRU or the FIFO policy.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::cache::CacheEntry;
use crate::error::CacheError;

// == Eviction Policy ==
/// Victim selection rule, fixed for the lifetime of a cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    /// Evict the least recently touched key
    #[default]
    Lru,
    /// Evict the oldest inserted key, ignoring reads
    Fifo,
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvictionPolicy::Lru => f.write_str("lru"),
            EvictionPolicy::Fifo => f.write_str("fifo"),
        }
    }
}

impl FromStr for EvictionPolicy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lru" => Ok(EvictionPolicy::Lru),
            "fifo" => Ok(EvictionPolicy::Fifo),
            other => Err(CacheError::InvalidConfig(format!(
                "unknown eviction policy '{}'",
                other
            ))),
        }
    }
}

// == Eviction Tracker ==
/// Tracks the state needed to choose an eviction victim.
///
/// Under LRU every touch stamps the key with the next value of a strictly
/// increasing clock; the victim is the key with the smallest stamp. Under
/// FIFO the order index stays empty and the victim is the entry with the
/// oldest `created_at`.
#[derive(Debug, Default)]
pub struct EvictionTracker {
    policy: EvictionPolicy,
    /// Recency stamp per key (LRU only)
    order: HashMap<String, u64>,
    clock: u64,
}

impl EvictionTracker {
    // == Constructor ==
    pub fn new(policy: EvictionPolicy) -> Self {
        Self {
            policy,
            order: HashMap::new(),
            clock: 0,
        }
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    // == Touch ==
    /// Marks a key as most recently used. No-op under FIFO.
    pub fn touch(&mut self, key: &str) {
        if self.policy != EvictionPolicy::Lru {
            return;
        }

        self.clock += 1;
        match self.order.get_mut(key) {
            Some(stamp) => *stamp = self.clock,
            None => {
                self.order.insert(key.to_string(), self.clock);
            }
        }
    }

    // == Remove ==
    /// Removes a key from the tracker.
    pub fn remove(&mut self, key: &str) {
        self.order.remove(key);
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.order.clear();
    }

    // == Select Victim ==
    /// Returns the key that should be evicted next, without removing it.
    ///
    /// Returns None if there is nothing to evict.
    pub fn select_victim<V>(&self, entries: &IndexMap<String, CacheEntry<V>>) -> Option<String> {
        match self.policy {
            EvictionPolicy::Lru => self
                .order
                .iter()
                .min_by_key(|(_, stamp)| **stamp)
                .map(|(key, _)| key.clone()),
            // min_by_key keeps the first minimum, so ties fall back to table order
            EvictionPolicy::Fifo => entries
                .iter()
                .min_by_key(|(_, entry)| entry.created_at)
                .map(|(key, _)| key.clone()),
        }
    }

    // == Length ==
    /// Returns the number of keys in the order index.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.order.contains_key(key)
    }
}
