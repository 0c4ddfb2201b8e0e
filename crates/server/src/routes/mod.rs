//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health            - Liveness check
//! GET  /health/ready      - Readiness check (store reachable)
//! POST /webhooks/orders   - Ingest an order payload
//! ```

pub mod health;
pub mod webhooks;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router with all routes and request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/webhooks/orders", post(webhooks::ingest_order))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
