use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
    pub models: Vec<String>,
}

#[utoipa::path(
    get,
    path = "/status",
    responses(
        (status = 200, description = "Service status and available models", body = StatusResponse)
    ),
    tag = "Status"
)]
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    match state.provider.list_models().await {
        Ok(models) => Json(StatusResponse {
            status: "ok".to_string(),
            models: models.into_iter().map(|m| m.name).collect(),
        }),
        Err(e) => {
            warn!(error = %e, "model backend unreachable");
            Json(StatusResponse {
                status: "degraded".to_string(),
                models: Vec::new(),
            })
        }
    }
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new().route("/status", get(status)).with_state(state)
}
