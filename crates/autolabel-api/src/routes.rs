//! API routes.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{health, predict, ready, setup, webhook};
use crate::middleware::{cors_layer, request_id, request_logging, security_headers};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let backend_routes = Router::new()
        .route("/predict", post(predict))
        .route("/setup", post(setup))
        .route("/webhook", post(webhook));

    let health_routes = Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    Router::new()
        .merge(backend_routes)
        .merge(health_routes)
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
