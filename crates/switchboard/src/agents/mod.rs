//! Agents: domain-specialized request processors with their own tool
//! allow-lists and conversation memory, plus the manager that routes
//! between them.

mod agent;
mod base;
mod general;
mod manager;
mod weather;

pub use agent::{Agent, AgentInfo, AgentReply};
pub use base::{AgentCore, WILDCARD_TOOL};
pub use general::GeneralAgent;
pub use manager::{AgentManager, RoutingDecision, RoutingResult, GENERAL_AGENT};
pub use weather::WeatherAgent;
