//! Axum HTTP server for the autolabel ML backend.
//!
//! This crate binds the model lifecycle contract to the host platform's
//! ML-backend protocol:
//! - `POST /predict` — inference on a batch of tasks
//! - `POST /setup` — project configuration
//! - `POST /webhook` — annotation lifecycle events
//! - `GET /health` — liveness and model version

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
