//! Multi-Tool Agent

use std::sync::Arc;

use agent_core::{Agent, AgentConfig, AgentContext, AgentResult, ToolRegistry, execute_agent};
use async_trait::async_trait;

use crate::prompts::MULTI_TOOL_AGENT_PROMPT;

/// General assistant over a caller-chosen subset of the shared registry.
///
/// Tool names are resolved on every `execute`, so the subset reflects the
/// registry at call time. Names with no registered tool are skipped. Model
/// calls are not retried.
#[derive(Debug)]
pub struct MultiToolAgent {
    config: AgentConfig,
    tool_names: Vec<String>,
    registry: Arc<ToolRegistry>,
}

impl MultiToolAgent {
    pub fn new(config: AgentConfig, tool_names: Vec<String>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            config,
            tool_names,
            registry,
        }
    }
}

#[async_trait]
impl Agent for MultiToolAgent {
    fn config(&self) -> &AgentConfig {
        &self.config
    }

    async fn execute(&self, context: &AgentContext) -> AgentResult {
        let tools = self.registry.get_many(&self.tool_names);
        execute_agent(&self.config, &tools, MULTI_TOOL_AGENT_PROMPT, context, 0).await
    }
}
