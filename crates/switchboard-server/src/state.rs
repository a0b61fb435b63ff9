use std::sync::Arc;

use switchboard::agents::AgentManager;
use switchboard::providers::Provider;

#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<AgentManager>,
    pub provider: Arc<dyn Provider>,
}

impl AppState {
    pub fn new(manager: Arc<AgentManager>, provider: Arc<dyn Provider>) -> Arc<AppState> {
        Arc::new(Self { manager, provider })
    }
}
