//! API Handlers
//!
//! HTTP request handlers for each cache endpoint.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;

use crate::cache::StatsSnapshot;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    CleanupResponse, ClearResponse, DeleteResponse, GetResponse, HasResponse, HealthResponse,
    KeysQuery, KeysResponse, MgetRequest, MgetResponse, MsetRequest, MsetResponse, SetRequest,
    SetResponse,
};
use crate::service::CacheService;

/// Application state shared across all handlers.
///
/// The service handle is cheap to clone and synchronises access internally.
#[derive(Clone)]
pub struct AppState {
    pub cache: CacheService<Value>,
}

impl AppState {
    pub fn new(cache: CacheService<Value>) -> Self {
        Self { cache }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Starts the cache's background sweep, so it must run inside a tokio runtime.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = CacheService::new(config.cache.clone())?;
        Ok(Self::new(cache.with_prefix(config.key_prefix.clone())))
    }
}

/// Handler for PUT /set
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ttl = req.ttl();
    state.cache.set(&req.key, req.value, ttl).await;

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /get/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let value = state
        .cache
        .get(&key)
        .await
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for GET /has/:key
///
/// Counts as a lookup in the statistics, like GET /get/:key.
pub async fn has_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<HasResponse> {
    let exists = state.cache.has(&key).await;
    Json(HasResponse { key, exists })
}

/// Handler for DELETE /del/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if !state.cache.delete(&key).await {
        return Err(CacheError::NotFound(key));
    }

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for GET /keys?pattern=
pub async fn keys_handler(
    State(state): State<AppState>,
    Query(query): Query<KeysQuery>,
) -> Json<KeysResponse> {
    let keys = state.cache.keys(query.pattern.as_deref()).await;
    Json(KeysResponse { keys })
}

/// Handler for PUT /mset
pub async fn mset_handler(
    State(state): State<AppState>,
    Json(req): Json<MsetRequest>,
) -> Result<Json<MsetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ttl = req.ttl();
    let entries = req.entries.into_iter().map(|entry| (entry.key, entry.value));
    let count = state.cache.set_many(entries, ttl).await;

    Ok(Json(MsetResponse { count }))
}

/// Handler for POST /mget
pub async fn mget_handler(
    State(state): State<AppState>,
    Json(req): Json<MgetRequest>,
) -> Json<MgetResponse> {
    let values = state.cache.get_many(req.keys.as_slice()).await;
    Json(MgetResponse { values })
}

/// Handler for POST /cleanup
pub async fn cleanup_handler(State(state): State<AppState>) -> Json<CleanupResponse> {
    let removed = state.cache.cleanup().await;
    Json(CleanupResponse { removed })
}

/// Handler for POST /clear
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.cache.clear().await;
    Json(ClearResponse::new())
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.cache.stats().await)
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
