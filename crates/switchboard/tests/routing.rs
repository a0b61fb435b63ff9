//! End-to-end routing behavior: scenario coverage for the manager, the
//! standard agents, and the fallback path.

use std::sync::Arc;

use async_trait::async_trait;
use switchboard::agents::{Agent, AgentManager, AgentReply, GeneralAgent};
use switchboard::errors::AgentError;
use switchboard::message::Message;
use switchboard::pipeline::ToolPipeline;
use switchboard::providers::testprovider::ScriptedProvider;
use switchboard::providers::ProviderError;
use switchboard::tools::builtin::BuiltinTools;
use switchboard::tools::ToolInvoker;

const NO_TOOLS_ANALYSIS: &str = r#"{"needsTools": false, "toolCalls": []}"#;

fn manager_with(provider: ScriptedProvider) -> AgentManager {
    AgentManager::new(Arc::new(provider), Arc::new(BuiltinTools::new()))
}

#[tokio::test]
async fn weather_question_routes_to_the_weather_agent() {
    let manager = manager_with(ScriptedProvider::new(["It's sunny in Tokyo right now."]));

    let result = manager
        .route_message("What is the weather in Tokyo?", Some("conv"), None)
        .await
        .unwrap();

    assert_eq!(result.agent_used, "weather");
    assert!(result.routing.confidence >= 0.6);
    assert!(result.tools_used.contains(&"get_weather".to_string()));
    assert_eq!(result.response, "It's sunny in Tokyo right now.");
    assert_eq!(result.context.conversation_id, "conv");
    assert_eq!(result.context.messages.len(), 2);
}

#[tokio::test]
async fn joke_request_runs_general_processing_without_tools() {
    // First scripted reply answers the tool analysis, second the synthesis.
    let provider = ScriptedProvider::default()
        .reply(NO_TOOLS_ANALYSIS)
        .reply("Why did the crab never share? Because it was shellfish.");
    let manager = manager_with(provider);

    let result = manager
        .route_message("Tell me a joke", Some("conv"), None)
        .await
        .unwrap();

    assert_eq!(result.agent_used, "general");
    assert!(result.tools_used.is_empty());
    assert!(result.response.contains("shellfish"));
}

#[tokio::test]
async fn explicit_agent_overrides_routing_regardless_of_content() {
    let provider = ScriptedProvider::new(["Weather agent says hello."]);
    let manager = manager_with(provider);

    let result = manager
        .route_message("Hello there", Some("conv"), Some("weather"))
        .await
        .unwrap();

    assert_eq!(result.agent_used, "weather");
    assert_eq!(result.routing.confidence, 1.0);
    assert_eq!(result.routing.reason, "Explicitly requested");
}

#[tokio::test]
async fn unknown_explicit_agent_falls_through_to_scoring() {
    let provider = ScriptedProvider::default()
        .reply(NO_TOOLS_ANALYSIS)
        .reply("Plain answer.");
    let manager = manager_with(provider);

    let result = manager
        .route_message("Tell me a joke", Some("conv"), Some("astrologer"))
        .await
        .unwrap();

    assert_eq!(result.agent_used, "general");
    assert_ne!(result.routing.reason, "Explicitly requested");
}

/// Agent that always fails, standing in for a crashed specialist.
struct BrokenAgent {
    tools: Vec<String>,
}

#[async_trait]
impl Agent for BrokenAgent {
    fn name(&self) -> &str {
        "weather"
    }

    fn description(&self) -> &str {
        "A weather agent that is currently broken"
    }

    fn allowed_tools(&self) -> &[String] {
        &self.tools
    }

    async fn process_request(
        &self,
        _message: &str,
        _conversation_id: &str,
    ) -> Result<AgentReply, AgentError> {
        Err(AgentError::Provider(ProviderError::ServerError(
            "model melted".to_string(),
        )))
    }

    fn history(&self, _conversation_id: &str) -> Vec<Message> {
        Vec::new()
    }

    fn clear_context(&self, _conversation_id: &str) {}
}

#[tokio::test]
async fn agent_failure_falls_back_to_general_processing() {
    let provider = Arc::new(
        ScriptedProvider::default()
            .reply(NO_TOOLS_ANALYSIS)
            .reply("Recovered without the weather agent."),
    );
    let invoker = ToolInvoker::new(Arc::new(BuiltinTools::new()));
    let pipeline = Arc::new(ToolPipeline::new(provider, invoker.clone()));
    let manager = AgentManager::with_agents(
        vec![
            Arc::new(BrokenAgent {
                tools: vec!["get_weather".to_string()],
            }),
            Arc::new(GeneralAgent::new(pipeline.clone(), invoker)),
        ],
        pipeline,
    );

    let result = manager
        .route_message("What's the weather in Oslo?", Some("conv"), None)
        .await
        .unwrap();

    assert_eq!(result.agent_used, "general");
    assert!(result.routing.reason.contains("Fallback due to"));
    assert!(result.routing.reason.contains("model melted"));
    assert_eq!(result.response, "Recovered without the weather agent.");
}

#[tokio::test]
async fn conversations_are_isolated_per_id() {
    let provider = ScriptedProvider::new(["Reply one.", "Reply two."]);
    let manager = manager_with(provider);

    manager
        .route_message("weather in Oslo", Some("conversation-a"), None)
        .await
        .unwrap();
    manager
        .route_message("weather in Bergen", Some("conversation-b"), None)
        .await
        .unwrap();

    let history_a = manager.get_agent_history("weather", "conversation-a");
    let history_b = manager.get_agent_history("weather", "conversation-b");
    assert_eq!(history_a.len(), 2);
    assert_eq!(history_b.len(), 2);
    assert!(history_a[0].content.contains("Oslo"));
    assert!(history_b[0].content.contains("Bergen"));
}

#[tokio::test]
async fn clearing_a_context_starts_it_fresh() {
    let provider = ScriptedProvider::new(["Sunny."]);
    let manager = manager_with(provider);

    manager
        .route_message("weather in Oslo", Some("conv"), None)
        .await
        .unwrap();
    assert_eq!(manager.get_agent_history("weather", "conv").len(), 2);

    manager.clear_agent_context("weather", "conv");
    assert!(manager.get_agent_history("weather", "conv").is_empty());
}

#[tokio::test]
async fn routing_result_serializes_the_wire_contract() {
    let provider = ScriptedProvider::new(["Sunny in Tokyo."]);
    let manager = manager_with(provider);

    let result = manager
        .route_message("weather in Tokyo", Some("conv"), None)
        .await
        .unwrap();
    let json = serde_json::to_value(&result).unwrap();

    assert!(json.get("response").is_some());
    assert_eq!(json["agentUsed"], "weather");
    assert!(json["toolsUsed"].is_array());
    assert!(json["routing"].get("agentName").is_some());
    assert!(json["routing"].get("confidence").is_some());
    assert!(json["routing"].get("reason").is_some());
    assert_eq!(json["context"]["conversationId"], "conv");
    assert!(json["context"]["messages"].is_array());
}
