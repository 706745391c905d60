//! Local Cache - an in-process key-value cache
//!
//! Bounded storage with TTL expiration, LRU/FIFO eviction, approximate memory
//! accounting and hit/miss statistics, plus a shared service handle and an
//! HTTP API on top of it.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheStore, EvictionPolicy, StatsSnapshot};
pub use config::{CacheConfig, Config};
pub use error::{CacheError, Result};
pub use service::CacheService;
pub use tasks::spawn_cleanup_task;
