//! API Module
//!
//! HTTP handlers and routing for the slot cache REST API.
//!
//! # Endpoints
//! - `PUT /slots/:key` - Persist a slot
//! - `GET /slots/:key` - Read a slot
//! - `DELETE /slots/:key` - Delete a slot
//! - `GET /slots` - List known slots
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
