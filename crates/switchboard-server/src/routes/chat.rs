use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use switchboard::agents::RoutingResult;
use tracing::error;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// The user's natural-language request
    pub message: String,
    /// Conversation to append to; defaults to a shared conversation
    pub conversation_id: Option<String>,
    /// Skip routing and use this agent directly
    pub agent: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    pub message: String,
    /// Model override for both analysis and synthesis
    pub model: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    pub response: String,
    pub tools_used: Vec<String>,
}

#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Request routed and answered", body = RoutingResult),
        (status = 502, description = "Language model backend unavailable")
    ),
    tag = "Chat"
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<RoutingResult>, StatusCode> {
    state
        .manager
        .route_message(
            &request.message,
            request.conversation_id.as_deref(),
            request.agent.as_deref(),
        )
        .await
        .map(Json)
        .map_err(|e| {
            error!(error = %e, "chat request failed");
            StatusCode::BAD_GATEWAY
        })
}

#[utoipa::path(
    post,
    path = "/tools/process",
    request_body = ProcessRequest,
    responses(
        (status = 200, description = "Message processed through the tool pipeline", body = ProcessResponse),
        (status = 502, description = "Language model backend unavailable")
    ),
    tag = "Chat"
)]
pub async fn process_with_tools(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ProcessRequest>,
) -> Result<Json<ProcessResponse>, StatusCode> {
    state
        .manager
        .pipeline()
        .process_with_tools(&request.message, request.model.as_deref())
        .await
        .map(|outcome| {
            Json(ProcessResponse {
                response: outcome.response,
                tools_used: outcome.tools_used,
            })
        })
        .map_err(|e| {
            error!(error = %e, "tool processing failed");
            StatusCode::BAD_GATEWAY
        })
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/tools/process", post(process_with_tools))
        .with_state(state)
}
