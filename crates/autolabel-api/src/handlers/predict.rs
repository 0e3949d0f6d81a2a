//! Prediction handler.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use autolabel_models::{Prediction, Task};

use crate::error::ApiResult;
use crate::state::AppState;

/// Prediction request from the host.
///
/// The host also sends project metadata and the label config; only the task
/// batch and the optional interaction context matter here.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub context: Option<Value>,
}

/// Prediction response to the host.
#[derive(Serialize)]
pub struct PredictResponse {
    pub results: Vec<Prediction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

/// Run inference on a batch of tasks.
pub async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> ApiResult<Json<PredictResponse>> {
    info!(tasks = request.tasks.len(), "Prediction requested");

    let results = state
        .model
        .predict(&request.tasks, request.context.as_ref())
        .await?;
    let model_version = results.first().map(|p| p.model_version.clone());

    Ok(Json(PredictResponse {
        results,
        model_version,
    }))
}
