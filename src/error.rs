//! Error types for the slot cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Store Error Enum ==
/// Failure reported by a durable store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The write would push the store above its global ceiling
    #[error("Capacity exceeded writing '{key}': {required} bytes required, {available} available")]
    Capacity {
        key: String,
        required: usize,
        available: usize,
    },

    /// Key cannot be addressed by this backend
    #[error("Key of {len} bytes exceeds the store limit of {max} bytes")]
    KeyTooLong { len: usize, max: usize },

    /// Filesystem failure
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other backend failure
    #[error("Store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns true for quota failures, the only kind that triggers eviction.
    pub fn is_capacity(&self) -> bool {
        matches!(self, StoreError::Capacity { .. })
    }
}

// == Cache Error Enum ==
/// Unified error type for the slot cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key is empty or too long
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Slot has no durable copy
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Store is full and eviction could not free enough space
    #[error("Storage full: {0}")]
    StorageFull(String),

    /// Value could not be serialized
    #[error("Serialization failed for '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Non-capacity store failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Blocking store task panicked or was cancelled
    #[error("Store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidKey(_) | CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::StorageFull(_) => StatusCode::INSUFFICIENT_STORAGE,
            CacheError::Serialization { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            CacheError::Store(_) | CacheError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the slot cache.
pub type Result<T> = std::result::Result<T, CacheError>;
