//! API Handlers
//!
//! HTTP request handlers for each slot cache endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use crate::cache::SlotCache;
use crate::config::Config;
use crate::error::{CacheError, Result, StoreError};
use crate::models::{
    DeleteResponse, HealthResponse, ReadSlotResponse, SlotListResponse, StatsResponse,
    WriteSlotRequest, WriteSlotResponse,
};
use crate::store::{DurableStore, FileStore, MemoryStore};

/// Runs a cache operation on the blocking pool.
///
/// Store backends do synchronous I/O under the registry lock.
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

/// Application state shared across all handlers.
///
/// The slot cache synchronizes internally, so handlers share it by cloning.
#[derive(Clone, Debug)]
pub struct AppState {
    pub cache: SlotCache,
}

impl AppState {
    /// Creates a new AppState with the given slot cache.
    pub fn new(cache: SlotCache) -> Self {
        Self { cache }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Uses a file-backed store when `store_dir` is set, otherwise keeps slots
    /// in memory.
    pub fn from_config(config: &Config) -> std::result::Result<Self, StoreError> {
        let store: Arc<dyn DurableStore> = match &config.store_dir {
            Some(dir) => {
                info!("Using file store at {:?}", dir);
                Arc::new(FileStore::open(dir, config.store_capacity)?)
            }
            None => {
                info!("Using in-memory store");
                Arc::new(MemoryStore::new(config.store_capacity))
            }
        };
        Ok(Self::new(SlotCache::new(store)))
    }
}

/// Handler for PUT /slots/:key
///
/// Persists a JSON value, evicting lower-priority slots if the store is full.
pub async fn write_slot_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<WriteSlotRequest>,
) -> Result<Json<WriteSlotResponse>> {
    let category = req.category_for(&key);
    let outcome = run_blocking(move || state.cache.write_raw(&key, category, &req.value)).await?;

    Ok(Json(WriteSlotResponse::new(outcome, category)))
}

/// Handler for GET /slots/:key
///
/// Returns the durable copy of a slot.
pub async fn read_slot_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ReadSlotResponse>> {
    let lookup = key.clone();
    let value = run_blocking(move || state.cache.read_raw(&lookup))
        .await?
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(ReadSlotResponse::new(key, value)))
}

/// Handler for DELETE /slots/:key
pub async fn delete_slot_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let target = key.clone();
    if !run_blocking(move || state.cache.delete(&target)).await? {
        return Err(CacheError::NotFound(key));
    }

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for GET /slots
pub async fn list_slots_handler(State(state): State<AppState>) -> Result<Json<SlotListResponse>> {
    let slots = run_blocking(move || Ok(state.cache.slots())).await?;
    Ok(Json(SlotListResponse { slots }))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let stats = run_blocking(move || Ok(state.cache.stats())).await?;
    Ok(Json(StatsResponse::new(stats)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
