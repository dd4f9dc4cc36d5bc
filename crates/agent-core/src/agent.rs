//! Agent Types
//!
//! The configuration, input and result envelope shared by every agent, and
//! the [`Agent`] trait the variants implement.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::execution::StepLog;
use crate::model::{GenerationOptions, ModelHandle, TokenUsage};
use crate::tool::ToolCall;

/// Agent configuration, fixed at construction
#[derive(Clone)]
pub struct AgentConfig {
    pub name: String,
    pub description: String,
    pub model: ModelHandle,
    /// Custom system prompt; the variant's default applies when unset or empty
    pub system_prompt: Option<String>,
}

impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("model", &self.model.model_id())
            .field("system_prompt", &self.system_prompt)
            .finish()
    }
}

/// Input for one agent invocation
#[derive(Clone, Debug, Default)]
pub struct AgentContext {
    pub query: String,
    pub options: Map<String, Value>,
}

impl AgentContext {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            options: Map::new(),
        }
    }

    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    /// Generation settings carried in `options` (`temperature`, `maxTokens`)
    #[allow(clippy::cast_possible_truncation)]
    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            temperature: self
                .options
                .get("temperature")
                .and_then(Value::as_f64)
                .map(|t| t as f32),
            max_tokens: self
                .options
                .get("maxTokens")
                .and_then(Value::as_u64)
                .and_then(|t| u32::try_from(t).ok()),
            ..Default::default()
        }
    }
}

/// Successful output of an invocation
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentOutput {
    /// Text of the final step
    pub text: String,
    /// Tool calls issued by the final step only
    pub tool_calls: Vec<ToolCall>,
    /// Usage summed over every step
    pub usage: TokenUsage,
    pub steps: Vec<StepLog>,
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<usize>,
    /// Wall-clock milliseconds
    pub duration: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Result envelope of one invocation.
///
/// Either `success` with `data`, or a failure with `error` and only the
/// duration in `metadata`.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<AgentOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub metadata: ResultMetadata,
}

impl AgentResult {
    pub fn success(data: AgentOutput, duration: u64, model: impl Into<String>) -> Self {
        Self {
            success: true,
            metadata: ResultMetadata {
                tool_calls: Some(data.tool_calls.len()),
                duration,
                model: Some(model.into()),
            },
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>, duration: u64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            metadata: ResultMetadata {
                duration,
                ..Default::default()
            },
        }
    }
}

/// A configured agent
#[async_trait]
pub trait Agent: Send + Sync {
    fn config(&self) -> &AgentConfig;

    fn name(&self) -> &str {
        &self.config().name
    }

    fn description(&self) -> &str {
        &self.config().description
    }

    /// Answer the query. Never fails: errors are reported in the result.
    async fn execute(&self, context: &AgentContext) -> AgentResult;
}
