//! HTTP adapters - REST API implementations.

pub mod middleware;
pub mod succession;

use axum::{routing::get, Router};

pub use succession::{succession_routes, SuccessionHandlers};

/// Full API: succession endpoints under `/api/succession` plus a liveness check.
pub fn api_router(handlers: SuccessionHandlers) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/api/succession", succession_routes(handlers))
}
