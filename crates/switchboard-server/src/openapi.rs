use switchboard::agents::{AgentInfo, RoutingDecision, RoutingResult};
use switchboard::context::ContextSnapshot;
use switchboard::message::{Message, Role};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        super::routes::chat::chat,
        super::routes::chat::process_with_tools,
        super::routes::agents::list_agents,
        super::routes::agents::agent_history,
        super::routes::agents::clear_agent_context,
        super::routes::status::status,
    ),
    components(schemas(
        super::routes::chat::ChatRequest,
        super::routes::chat::ProcessRequest,
        super::routes::chat::ProcessResponse,
        super::routes::status::StatusResponse,
        RoutingResult,
        RoutingDecision,
        ContextSnapshot,
        Message,
        Role,
        AgentInfo,
    ))
)]
pub struct ApiDoc;
