//! Agents and the Agent Factory
//!
//! Agent types are a closed set keyed by a string discriminator. Each type
//! carries built-in defaults that caller overrides replace field by field.

mod multi_tool;
mod weather;

pub use multi_tool::MultiToolAgent;
pub use weather::WeatherAgent;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use agent_core::{Agent, AgentConfig, AgentError, ModelHandle, Result, ToolRegistry};

/// Registered agent types
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AgentKind {
    Weather,
    Multi,
}

impl AgentKind {
    pub const ALL: [Self; 2] = [Self::Weather, Self::Multi];

    /// Discriminator used on the command line
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::Multi => "multi",
        }
    }

    pub const fn default_name(self) -> &'static str {
        match self {
            Self::Weather => "WeatherAgent",
            Self::Multi => "MultiToolAgent",
        }
    }

    pub const fn default_description(self) -> &'static str {
        match self {
            Self::Weather => "Provides current weather information for any location",
            Self::Multi => "General-purpose assistant that can use any registered tool",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentKind {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| AgentError::UnknownAgent {
                name: s.to_string(),
                available: Self::ALL.iter().map(|k| k.as_str().to_string()).collect(),
            })
    }
}

/// Caller-supplied fields that replace an agent type's defaults
#[derive(Clone, Debug, Default)]
pub struct AgentOverrides {
    pub name: Option<String>,
    pub description: Option<String>,
    pub system_prompt: Option<String>,
    /// Tool subset for `multi`; ignored by `weather`
    pub tools: Option<Vec<String>>,
}

/// Build an agent of type `agent_type` bound to `model`.
///
/// Fails with [`AgentError::UnknownAgent`] listing the valid types when the
/// discriminator is not registered.
pub fn create_agent(
    agent_type: &str,
    model: ModelHandle,
    overrides: AgentOverrides,
    registry: Arc<ToolRegistry>,
) -> Result<Box<dyn Agent>> {
    let kind: AgentKind = agent_type.parse()?;
    let config = AgentConfig {
        name: overrides.name.unwrap_or_else(|| kind.default_name().to_string()),
        description: overrides
            .description
            .unwrap_or_else(|| kind.default_description().to_string()),
        model,
        system_prompt: overrides.system_prompt,
    };

    tracing::debug!(agent = %kind, name = %config.name, "Creating agent");
    let agent: Box<dyn Agent> = match kind {
        AgentKind::Weather => Box::new(WeatherAgent::new(config, &registry)),
        AgentKind::Multi => {
            let tools = overrides
                .tools
                .unwrap_or_else(|| registry.names().into_iter().map(String::from).collect());
            Box::new(MultiToolAgent::new(config, tools, registry))
        }
    };
    Ok(agent)
}

/// `(type, description)` for every registered agent type
pub fn list_agents() -> Vec<(&'static str, &'static str)> {
    AgentKind::ALL
        .iter()
        .map(|kind| (kind.as_str(), kind.default_description()))
        .collect()
}
