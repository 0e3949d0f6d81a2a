//! Webhook handler for annotation lifecycle events.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use autolabel_models::WebhookEvent;

use crate::error::ApiResult;
use crate::state::AppState;

/// Webhook delivery from the host.
#[derive(Debug, Deserialize)]
pub struct WebhookRequest {
    pub action: WebhookEvent,
    #[serde(flatten)]
    pub payload: Value,
}

/// Dispatch an annotation lifecycle event to the update hook.
pub async fn webhook(
    State(state): State<AppState>,
    Json(request): Json<WebhookRequest>,
) -> ApiResult<Json<Value>> {
    info!(action = %request.action, "Webhook received");

    state.model.fit(&request.action, &request.payload).await?;

    Ok(Json(serde_json::json!({ "status": "ok" })))
}
