//! Request DTOs for the cache HTTP API
//!
//! Defines the structure of incoming HTTP request bodies.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::cache::ttl_from_millis;

/// Maximum accepted key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Validates a single key, returning an error message if it is rejected.
fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        ));
    }
    None
}

/// Request body for the SET operation (PUT /set)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: Any JSON value
/// - `ttl_ms`: Optional TTL in milliseconds; zero or negative never expires
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    pub key: String,
    pub value: Value,
    #[serde(default)]
    pub ttl_ms: Option<i64>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_key(&self.key)
    }

    /// TTL to pass to the cache; None selects the configured default.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_ms.map(ttl_from_millis)
    }
}

/// One entry of a batch SET
#[derive(Debug, Clone, Deserialize)]
pub struct MsetEntry {
    pub key: String,
    pub value: Value,
}

/// Request body for the batch SET operation (PUT /mset)
#[derive(Debug, Clone, Deserialize)]
pub struct MsetRequest {
    pub entries: Vec<MsetEntry>,
    #[serde(default)]
    pub ttl_ms: Option<i64>,
}

impl MsetRequest {
    pub fn validate(&self) -> Option<String> {
        self.entries.iter().find_map(|entry| validate_key(&entry.key))
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_ms.map(ttl_from_millis)
    }
}

/// Request body for the batch GET operation (POST /mget)
#[derive(Debug, Clone, Deserialize)]
pub struct MgetRequest {
    pub keys: Vec<String>,
}

/// Query string for GET /keys
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeysQuery {
    pub pattern: Option<String>,
}
