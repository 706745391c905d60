//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Insertion instant; reset when the key is overwritten
    pub created_at: Instant,
    /// Instant of the last successful read
    pub accessed_at: Instant,
    /// Expiration instant, None = no expiration
    pub expires_at: Option<Instant>,
    /// TTL requested at insertion, zero = no expiration
    pub ttl: Duration,
    /// Estimated footprint charged against the memory budget
    pub size_bytes: usize,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl` - Time to live; `Duration::ZERO` means the entry never expires
    /// * `size_bytes` - Estimated footprint of key, value and metadata
    pub fn new(value: V, ttl: Duration, size_bytes: usize) -> Self {
        let now = Instant::now();
        // A TTL too large to represent is treated as no expiration
        let expires_at = if ttl.is_zero() {
            None
        } else {
            now.checked_add(ttl)
        };

        Self {
            value,
            created_at: now,
            accessed_at: now,
            expires_at,
            ttl,
            size_bytes,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is considered expired when the current time is greater than or
    /// equal to the expiration time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Checks expiration against a caller-supplied instant.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(Duration::ZERO)` if the entry has expired
    /// - `Some(remaining)` if the entry has TTL and hasn't expired
    /// - `None` if the entry never expires
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|expires| expires.saturating_duration_since(Instant::now()))
    }

    /// Records a successful read.
    pub fn mark_accessed(&mut self, now: Instant) {
        self.accessed_at = now;
    }
}

// == Utility Functions ==
/// Converts a signed millisecond TTL into the duration accepted by `set`.
///
/// Zero and negative values both mean "never expires" and map to `Duration::ZERO`.
pub fn ttl_from_millis(ms: i64) -> Duration {
    if ms <= 0 {
        Duration::ZERO
    } else {
        Duration::from_millis(ms as u64)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_entry_creation_no_ttl() {
        let entry = CacheEntry::new("test_value", Duration::ZERO, 10);

        assert_eq!(entry.value, "test_value");
        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired());
        assert_eq!(entry.size_bytes, 10);
    }

    #[test]
    fn test_entry_creation_with_ttl() {
        let entry = CacheEntry::new("test_value", Duration::from_secs(60), 10);

        assert!(entry.expires_at.is_some());
        assert_eq!(entry.ttl, Duration::from_secs(60));
        assert_eq!(entry.created_at, entry.accessed_at);
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new("test_value", Duration::from_millis(10), 0);

        assert!(!entry.is_expired());

        sleep(Duration::from_millis(20));

        assert!(entry.is_expired());
    }

    #[test]
    fn test_ttl_remaining() {
        let entry = CacheEntry::new("test_value", Duration::from_secs(10), 0);

        let remaining = entry.ttl_remaining().unwrap();
        assert!(remaining <= Duration::from_secs(10));
        assert!(remaining >= Duration::from_secs(9));
    }

    #[test]
    fn test_ttl_remaining_no_expiration() {
        let entry = CacheEntry::new("test_value", Duration::ZERO, 0);
        assert!(entry.ttl_remaining().is_none());
    }

    #[test]
    fn test_ttl_remaining_expired() {
        let entry = CacheEntry::new("test_value", Duration::from_millis(5), 0);

        sleep(Duration::from_millis(15));

        assert_eq!(entry.ttl_remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new("test", Duration::from_millis(100), 0);
        let expires_at = entry.expires_at.unwrap();

        assert!(!entry.is_expired_at(expires_at - Duration::from_millis(1)));
        assert!(entry.is_expired_at(expires_at), "Entry should be expired at boundary");
    }

    #[test]
    fn test_huge_ttl_never_expires() {
        let entry = CacheEntry::new("test", Duration::MAX, 0);
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_mark_accessed() {
        let mut entry = CacheEntry::new("test", Duration::ZERO, 0);
        let later = entry.created_at + Duration::from_millis(5);

        entry.mark_accessed(later);

        assert_eq!(entry.accessed_at, later);
        assert!(entry.accessed_at > entry.created_at);
    }

    #[test]
    fn test_ttl_from_millis() {
        assert_eq!(ttl_from_millis(0), Duration::ZERO);
        assert_eq!(ttl_from_millis(-1), Duration::ZERO);
        assert_eq!(ttl_from_millis(i64::MIN), Duration::ZERO);
        assert_eq!(ttl_from_millis(250), Duration::from_millis(250));
    }
}
