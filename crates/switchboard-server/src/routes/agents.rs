use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use switchboard::agents::AgentInfo;
use switchboard::message::Message;

use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/agents",
    responses(
        (status = 200, description = "Registered agents keyed by name", body = HashMap<String, AgentInfo>)
    ),
    tag = "Agents"
)]
pub async fn list_agents(
    State(state): State<Arc<AppState>>,
) -> Json<HashMap<String, AgentInfo>> {
    Json(state.manager.get_available_agents())
}

#[utoipa::path(
    get,
    path = "/agents/{name}/history/{conversation_id}",
    params(
        ("name" = String, Path, description = "Agent name"),
        ("conversation_id" = String, Path, description = "Conversation id")
    ),
    responses(
        (status = 200, description = "Conversation history; empty for unknown agents or conversations", body = Vec<Message>)
    ),
    tag = "Agents"
)]
pub async fn agent_history(
    State(state): State<Arc<AppState>>,
    Path((name, conversation_id)): Path<(String, String)>,
) -> Json<Vec<Message>> {
    Json(state.manager.get_agent_history(&name, &conversation_id))
}

#[utoipa::path(
    delete,
    path = "/agents/{name}/context/{conversation_id}",
    params(
        ("name" = String, Path, description = "Agent name"),
        ("conversation_id" = String, Path, description = "Conversation id")
    ),
    responses(
        (status = 204, description = "Context cleared; a no-op for unknown agents")
    ),
    tag = "Agents"
)]
pub async fn clear_agent_context(
    State(state): State<Arc<AppState>>,
    Path((name, conversation_id)): Path<(String, String)>,
) -> StatusCode {
    state.manager.clear_agent_context(&name, &conversation_id);
    StatusCode::NO_CONTENT
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/agents", get(list_agents))
        .route("/agents/{name}/history/{conversation_id}", get(agent_history))
        .route(
            "/agents/{name}/context/{conversation_id}",
            delete(clear_agent_context),
        )
        .with_state(state)
}
