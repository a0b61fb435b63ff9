use std::sync::Arc;

use async_trait::async_trait;
use indoc::indoc;
use serde_json::{json, Value};
use tracing::warn;

use super::agent::{Agent, AgentReply};
use super::base::AgentCore;
use crate::errors::AgentError;
use crate::message::{Message, Role};
use crate::pipeline::extract_location;
use crate::providers::Provider;
use crate::tools::builtin::WEATHER_TOOL;
use crate::tools::ToolInvoker;

const SYSTEM_PROMPT: &str = indoc! {"
    You are a weather assistant. Answer questions about current conditions
    and forecasts using the weather data provided. Be concise and mention
    the location and units in your answer.
"};

const DEFAULT_LOCATION: &str = "Unknown";

/// Metadata key for the location of the previous request, so follow-up
/// questions without a place name stay on topic.
const LAST_LOCATION_KEY: &str = "lastLocation";

/// Agent specialized in weather questions. Allow-list covers only the
/// weather tool.
pub struct WeatherAgent {
    core: AgentCore,
    provider: Arc<dyn Provider>,
}

impl WeatherAgent {
    pub fn new(provider: Arc<dyn Provider>, invoker: ToolInvoker) -> Self {
        Self {
            core: AgentCore::new(
                "weather",
                "Answers weather and forecast questions using the weather tool",
                SYSTEM_PROMPT,
                vec![WEATHER_TOOL.to_string()],
                invoker,
            ),
            provider,
        }
    }
}

#[async_trait]
impl Agent for WeatherAgent {
    fn name(&self) -> &str {
        self.core.name()
    }

    fn description(&self) -> &str {
        self.core.description()
    }

    fn allowed_tools(&self) -> &[String] {
        self.core.allowed_tools()
    }

    async fn process_request(
        &self,
        message: &str,
        conversation_id: &str,
    ) -> Result<AgentReply, AgentError> {
        self.core
            .contexts()
            .add_message(conversation_id, Role::User, message, vec![]);

        let location = match extract_location(message) {
            Some(location) => {
                self.core.contexts().set_metadata(
                    conversation_id,
                    LAST_LOCATION_KEY,
                    json!(location),
                );
                location
            }
            None => self
                .core
                .contexts()
                .get_or_create(conversation_id)
                .metadata
                .get(LAST_LOCATION_KEY)
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
        };
        let units = if message.to_lowercase().contains("fahrenheit") {
            "fahrenheit"
        } else {
            "celsius"
        };

        let mut tools_used = Vec::new();
        let report = match self
            .core
            .execute_tool(WEATHER_TOOL, json!({"location": location, "units": units}))
            .await
        {
            Ok(text) => {
                tools_used.push(WEATHER_TOOL.to_string());
                Some(text)
            }
            Err(e) => {
                warn!(error = %e, location, "weather tool failed");
                None
            }
        };

        let response = match report {
            Some(report) => {
                let history = self.core.contexts().history(conversation_id);
                let prompt = format!(
                    "{}\nWeather data:\n{report}\n",
                    self.core.create_enhanced_prompt(message, &history, true)
                );
                // A gateway failure is not ours to absorb; the manager
                // falls back to general processing.
                self.provider.chat(&prompt, None).await?
            }
            None => format!(
                "I'm sorry, I couldn't retrieve the weather for {location} right now. \
                 Please try again in a moment."
            ),
        };

        self.core.contexts().add_message(
            conversation_id,
            Role::Assistant,
            &response,
            tools_used.clone(),
        );

        Ok(AgentReply {
            response,
            tools_used,
            context: self.core.contexts().snapshot(conversation_id),
        })
    }

    fn history(&self, conversation_id: &str) -> Vec<Message> {
        self.core.contexts().history(conversation_id)
    }

    fn clear_context(&self, conversation_id: &str) {
        self.core.contexts().clear(conversation_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::testprovider::ScriptedProvider;
    use crate::tools::builtin::BuiltinTools;

    fn agent_with(provider: ScriptedProvider) -> WeatherAgent {
        WeatherAgent::new(
            Arc::new(provider),
            ToolInvoker::new(Arc::new(BuiltinTools::new())),
        )
    }

    #[tokio::test]
    async fn answers_with_the_weather_tool() {
        let agent = agent_with(ScriptedProvider::new(["It is sunny in Tokyo."]));

        let reply = agent
            .process_request("What is the weather in Tokyo?", "conv")
            .await
            .unwrap();

        assert_eq!(reply.response, "It is sunny in Tokyo.");
        assert_eq!(reply.tools_used, vec![WEATHER_TOOL.to_string()]);
        assert_eq!(reply.context.messages.len(), 2);
        assert_eq!(reply.context.messages[0].content, "What is the weather in Tokyo?");
    }

    #[tokio::test]
    async fn records_both_turns_before_returning() {
        let agent = agent_with(ScriptedProvider::new(["Cold in Oslo."]));
        agent
            .process_request("Forecast for Oslo please", "conv")
            .await
            .unwrap();

        let history = agent.history("conv");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(
            history[1].tools_used,
            Some(vec![WEATHER_TOOL.to_string()])
        );
    }

    #[tokio::test]
    async fn follow_up_without_a_location_reuses_the_previous_one() {
        let provider = Arc::new(ScriptedProvider::new([
            "Sunny in Tokyo.",
            "Still sunny.",
            "No idea where you are.",
        ]));
        let agent = WeatherAgent::new(
            provider.clone(),
            ToolInvoker::new(Arc::new(BuiltinTools::new())),
        );

        agent
            .process_request("What is the weather in Tokyo?", "conv")
            .await
            .unwrap();
        let reply = agent
            .process_request("And how humid is it?", "conv")
            .await
            .unwrap();

        assert_eq!(reply.tools_used, vec![WEATHER_TOOL.to_string()]);
        assert!(provider.prompts()[1].contains("Weather in Tokyo:"));

        // Clearing the context forgets the remembered location too.
        agent.clear_context("conv");
        agent
            .process_request("How humid is it?", "conv")
            .await
            .unwrap();
        assert!(provider.prompts()[2].contains("Weather in Unknown:"));
    }

    #[tokio::test]
    async fn gateway_failure_propagates_for_the_manager_to_handle() {
        let agent = agent_with(ScriptedProvider::default().failure("backend down"));
        let err = agent
            .process_request("weather in Paris", "conv")
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Provider(_)));
    }
}
