use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use super::agent::{Agent, AgentInfo};
use super::general::GeneralAgent;
use super::weather::WeatherAgent;
use crate::context::{ContextSnapshot, DEFAULT_CONVERSATION_ID};
use crate::errors::AgentError;
use crate::message::Message;
use crate::pipeline::ToolPipeline;
use crate::providers::Provider;
use crate::tools::{ToolClient, ToolInvoker};

/// Name reported when general processing produced the answer.
pub const GENERAL_AGENT: &str = "general";

const CONFIDENCE_THRESHOLD: f64 = 0.6;
const BASE_CONFIDENCE: f64 = 0.5;
const CONFIDENCE_PER_KEYWORD: f64 = 0.2;
const MAX_CONFIDENCE: f64 = 0.95;

/// Domains scored during routing, in priority order. Earlier entries win
/// ties. A domain may have no registered agent; its requests then run
/// through general processing.
const DOMAINS: &[(&str, &[&str])] = &[
    (
        "weather",
        &[
            "weather",
            "temperature",
            "forecast",
            "rain",
            "snow",
            "sunny",
            "cloudy",
            "humidity",
            "wind",
        ],
    ),
    (
        "calculator",
        &[
            "calculate",
            "math",
            "factorial",
            "fibonacci",
            "prime",
            "multiply",
            "divide",
            "equation",
            "arithmetic",
        ],
    ),
    (
        "database",
        &["database", "query", "sql", "table", "record", "schema"],
    ),
];

/// Why a request went to a particular agent. Produced fresh per request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoutingDecision {
    pub agent_name: String,
    pub confidence: f64,
    pub reason: String,
}

/// Aggregate answer for one routed request. The field names are a wire
/// contract; HTTP layers serialize this as-is.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoutingResult {
    pub response: String,
    pub agent_used: String,
    pub tools_used: Vec<String>,
    pub routing: RoutingDecision,
    pub context: ContextSnapshot,
}

/// Owns the fixed agent registry and picks an agent (or general
/// processing) for each incoming request. Stateless across requests apart
/// from the registry and each agent's own conversation maps.
pub struct AgentManager {
    agents: HashMap<String, Arc<dyn Agent>>,
    pipeline: Arc<ToolPipeline>,
}

impl AgentManager {
    /// Standard registry: the weather agent plus the general catch-all.
    pub fn new(provider: Arc<dyn Provider>, tool_client: Arc<dyn ToolClient>) -> Self {
        let invoker = ToolInvoker::new(tool_client);
        let pipeline = Arc::new(ToolPipeline::new(provider.clone(), invoker.clone()));

        let weather: Arc<dyn Agent> = Arc::new(WeatherAgent::new(provider, invoker.clone()));
        let general: Arc<dyn Agent> = Arc::new(GeneralAgent::new(pipeline.clone(), invoker));

        let mut agents = HashMap::new();
        agents.insert(weather.name().to_string(), weather);
        agents.insert(general.name().to_string(), general);

        Self { agents, pipeline }
    }

    /// Build a manager around an explicit registry. Used by tests and
    /// deployments with custom agents.
    pub fn with_agents(agents: Vec<Arc<dyn Agent>>, pipeline: Arc<ToolPipeline>) -> Self {
        let agents = agents
            .into_iter()
            .map(|agent| (agent.name().to_string(), agent))
            .collect();
        Self { agents, pipeline }
    }

    /// Direct access to the tool-selection pipeline, bypassing routing.
    pub fn pipeline(&self) -> Arc<ToolPipeline> {
        self.pipeline.clone()
    }

    /// Score the message against each known domain. Confidence is
    /// `0.5 + 0.2 x matched keywords`, capped at 0.95; a domain needs at
    /// least 0.6 to win, so one clear keyword (0.7) is enough. Ties go to
    /// the earlier domain in priority order.
    pub fn analyze_and_route(&self, message: &str) -> RoutingDecision {
        let lower = message.to_lowercase();

        let mut best: Option<(&str, usize, f64)> = None;
        for (domain, keywords) in DOMAINS {
            let matched = keywords.iter().filter(|k| lower.contains(*k)).count();
            if matched == 0 {
                continue;
            }
            let confidence =
                (BASE_CONFIDENCE + CONFIDENCE_PER_KEYWORD * matched as f64).min(MAX_CONFIDENCE);
            if best.map_or(true, |(_, _, c)| confidence > c) {
                best = Some((domain, matched, confidence));
            }
        }

        match best {
            Some((domain, matched, confidence)) if confidence >= CONFIDENCE_THRESHOLD => {
                RoutingDecision {
                    agent_name: domain.to_string(),
                    confidence,
                    reason: format!("Matched {matched} {domain} keyword(s)"),
                }
            }
            _ => RoutingDecision {
                agent_name: GENERAL_AGENT.to_string(),
                confidence: BASE_CONFIDENCE,
                reason: "No domain matched strongly enough".to_string(),
            },
        }
    }

    /// Route one request: explicit override, keyword scoring, selected
    /// agent, and fallback to general processing when the agent fails.
    pub async fn route_message(
        &self,
        message: &str,
        conversation_id: Option<&str>,
        explicit_agent: Option<&str>,
    ) -> Result<RoutingResult, AgentError> {
        let conversation_id = conversation_id.unwrap_or(DEFAULT_CONVERSATION_ID);

        let decision = match explicit_agent {
            Some(name) if self.agents.contains_key(name) => RoutingDecision {
                agent_name: name.to_string(),
                confidence: 1.0,
                reason: "Explicitly requested".to_string(),
            },
            _ => self.analyze_and_route(message),
        };
        info!(
            agent = %decision.agent_name,
            confidence = decision.confidence,
            "routing decision"
        );

        if let Some(agent) = self.agents.get(&decision.agent_name) {
            match agent.process_request(message, conversation_id).await {
                Ok(reply) => {
                    return Ok(RoutingResult {
                        response: reply.response,
                        agent_used: agent.name().to_string(),
                        tools_used: reply.tools_used,
                        routing: decision,
                        context: reply.context,
                    })
                }
                Err(e) => {
                    warn!(
                        agent = %decision.agent_name,
                        error = %e,
                        "agent failed, falling back to general processing"
                    );
                    let routing = RoutingDecision {
                        agent_name: GENERAL_AGENT.to_string(),
                        confidence: decision.confidence,
                        reason: format!("Fallback due to {} error: {e}", decision.agent_name),
                    };
                    return self.run_pipeline(message, conversation_id, routing).await;
                }
            }
        }

        // The decision named a domain with no registered agent.
        self.run_pipeline(message, conversation_id, decision).await
    }

    async fn run_pipeline(
        &self,
        message: &str,
        conversation_id: &str,
        routing: RoutingDecision,
    ) -> Result<RoutingResult, AgentError> {
        let outcome = self.pipeline.process_with_tools(message, None).await?;
        Ok(RoutingResult {
            response: outcome.response,
            agent_used: GENERAL_AGENT.to_string(),
            tools_used: outcome.tools_used,
            routing,
            context: ContextSnapshot::empty(conversation_id),
        })
    }

    /// Discovery: name, description, and tools for every registered agent.
    pub fn get_available_agents(&self) -> HashMap<String, AgentInfo> {
        self.agents
            .iter()
            .map(|(name, agent)| (name.clone(), agent.info()))
            .collect()
    }

    pub fn get_agent(&self, name: &str) -> Option<Arc<dyn Agent>> {
        self.agents.get(name).cloned()
    }

    /// Empty for an unknown agent name rather than an error.
    pub fn get_agent_history(&self, name: &str, conversation_id: &str) -> Vec<Message> {
        self.get_agent(name)
            .map(|agent| agent.history(conversation_id))
            .unwrap_or_default()
    }

    /// No-op for an unknown agent name.
    pub fn clear_agent_context(&self, name: &str, conversation_id: &str) {
        if let Some(agent) = self.get_agent(name) {
            agent.clear_context(conversation_id);
        }
    }
}
