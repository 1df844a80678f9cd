//! API Routes
//!
//! Configures the Axum router with all slot cache endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    delete_slot_handler, health_handler, list_slots_handler, read_slot_handler, stats_handler,
    write_slot_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /slots/:key` - Persist a slot
/// - `GET /slots/:key` - Read a slot
/// - `DELETE /slots/:key` - Delete a slot
/// - `GET /slots` - List known slots
/// - `GET /stats` - Cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin, the front ends run in browsers
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/slots/:key",
            get(read_slot_handler)
                .put(write_slot_handler)
                .delete(delete_slot_handler),
        )
        .route("/slots", get(list_slots_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
