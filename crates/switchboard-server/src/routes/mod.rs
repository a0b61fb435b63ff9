use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

pub mod agents;
pub mod chat;
pub mod status;

pub fn configure(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(chat::routes(state.clone()))
        .merge(agents::routes(state.clone()))
        .merge(status::routes(state))
}
