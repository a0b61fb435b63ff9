use thiserror::Error;

use crate::providers::ProviderError;
use crate::tools::ToolError;

/// Failures surfaced by agents and the routing manager.
///
/// Agents absorb the failures they own (tool permission and execution
/// problems become apologetic replies); an `Err` from an agent means the
/// language-model backend itself was unavailable, which the routing
/// manager treats as a miss-route.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}
