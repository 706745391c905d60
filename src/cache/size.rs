//! Memory Estimation Module
//!
//! Approximates the footprint of cached values. The figures are estimates
//! used only to enforce the memory budget, not an exact accounting.

use std::fmt;

use serde::Serialize;

/// Fixed per-entry overhead charged for metadata.
pub const ENTRY_OVERHEAD_BYTES: usize = 64;

/// Bytes charged for a value its estimator cannot size.
pub const UNESTIMABLE_VALUE_BYTES: usize = 1024;

// == Size Estimator ==
/// Strategy for estimating the size in bytes of a cached value.
///
/// Returning `None` signals the value cannot be sized; the store then charges
/// [`UNESTIMABLE_VALUE_BYTES`] instead of failing the insertion.
pub trait SizeEstimator<V>: fmt::Debug + Send + Sync {
    fn estimate(&self, value: &V) -> Option<usize>;
}

/// Sizes values by their JSON text, two bytes per UTF-16 code unit.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSizeEstimator;

impl<V: Serialize> SizeEstimator<V> for JsonSizeEstimator {
    fn estimate(&self, value: &V) -> Option<usize> {
        serde_json::to_string(value)
            .ok()
            .map(|text| utf16_bytes(&text))
    }
}

/// Charges the same size for every value.
#[derive(Debug, Clone, Copy)]
pub struct FixedSizeEstimator(pub usize);

impl<V> SizeEstimator<V> for FixedSizeEstimator {
    fn estimate(&self, _value: &V) -> Option<usize> {
        Some(self.0)
    }
}

/// Two bytes per UTF-16 code unit.
pub fn utf16_bytes(text: &str) -> usize {
    text.encode_utf16().count() * 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;
    use serde::Serializer;
    use serde_json::json;

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("cycle detected"))
        }
    }

    #[test]
    fn test_utf16_bytes() {
        assert_eq!(utf16_bytes(""), 0);
        assert_eq!(utf16_bytes("abc"), 6);
        // Astral characters take two code units
        assert_eq!(utf16_bytes("\u{1F600}"), 4);
    }

    #[test]
    fn test_json_estimator_strings_include_quotes() {
        assert_eq!(JsonSizeEstimator.estimate(&"hello"), Some(14));
    }

    #[test]
    fn test_json_estimator_structured_value() {
        let value = json!({"a": 1});
        // {"a":1} is 7 characters
        assert_eq!(JsonSizeEstimator.estimate(&value), Some(14));
    }

    #[test]
    fn test_json_estimator_unserializable() {
        assert_eq!(JsonSizeEstimator.estimate(&Unserializable), None);
    }

    #[test]
    fn test_fixed_estimator() {
        assert_eq!(FixedSizeEstimator(32).estimate(&Unserializable), Some(32));
    }
}
