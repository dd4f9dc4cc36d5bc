//! Weather Agent

use agent_core::{Agent, AgentConfig, AgentContext, AgentResult, ToolRegistry, execute_agent};
use async_trait::async_trait;

use crate::prompts::WEATHER_AGENT_PROMPT;
use crate::tools::WEATHER_TOOL;

/// Retries for each model call of a weather run
const WEATHER_MODEL_RETRIES: u32 = 3;

/// Answers weather questions with the `weather` tool only
#[derive(Debug)]
pub struct WeatherAgent {
    config: AgentConfig,
    tools: ToolRegistry,
}

impl WeatherAgent {
    /// Takes the `weather` tool from `registry`; other tools are not exposed
    pub fn new(config: AgentConfig, registry: &ToolRegistry) -> Self {
        Self {
            config,
            tools: registry.get_many(&[WEATHER_TOOL]),
        }
    }
}

#[async_trait]
impl Agent for WeatherAgent {
    fn config(&self) -> &AgentConfig {
        &self.config
    }

    async fn execute(&self, context: &AgentContext) -> AgentResult {
        execute_agent(
            &self.config,
            &self.tools,
            WEATHER_AGENT_PROMPT,
            context,
            WEATHER_MODEL_RETRIES,
        )
        .await
    }
}
