//! Setup handler.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::state::AppState;

/// Setup request from the host.
#[derive(Debug, Deserialize)]
pub struct SetupRequest {
    #[serde(default)]
    pub project: Option<String>,
    /// The project's labeling configuration
    #[serde(default)]
    pub schema: Option<String>,
}

/// Setup response.
#[derive(Serialize)]
pub struct SetupResponse {
    pub model_version: String,
}

/// Configure the backend for a project.
pub async fn setup(
    State(state): State<AppState>,
    Json(request): Json<SetupRequest>,
) -> ApiResult<Json<SetupResponse>> {
    let model_version = state
        .model
        .setup(request.project.as_deref(), request.schema.as_deref())
        .await?;

    Ok(Json(SetupResponse { model_version }))
}
