//! OpenAI Chat Completions Binding
//!
//! Implementation of `LanguageModel` over `POST {base}/chat/completions`
//! with native function calling.

use std::collections::BTreeMap;

use agent_core::{
    error::{AgentError, Result},
    message::{Message, Role},
    model::{Completion, FinishReason, GenerationOptions, LanguageModel, TokenUsage, ToolChoice},
    tool::{ToolCall, ToolSchema},
};
use async_trait::async_trait;
use serde_json::{Map, Value, json};

use crate::config::{ProviderConfig, ProviderName};
use crate::http;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI chat model
pub struct OpenAiModel {
    client: reqwest::Client,
    model_id: String,
    api_key: String,
    base_url: String,
    organization: Option<String>,
    headers: BTreeMap<String, String>,
}

impl OpenAiModel {
    /// Create from a merged provider configuration
    pub fn new(model_id: impl Into<String>, config: &ProviderConfig) -> Result<Self> {
        let api_key = ProviderConfig::require(config.api_key.as_ref(), ProviderName::OpenAi, "OPENAI_API_KEY")?;
        Ok(Self {
            client: reqwest::Client::new(),
            model_id: model_id.into(),
            api_key,
            base_url: http::trim_base_url(config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)),
            organization: config.organization.clone(),
            headers: config.headers.clone(),
        })
    }

    /// Build the request payload
    fn request_body(
        model_id: &str,
        messages: &[Message],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Value {
        let mut body = json!({
            "model": model_id,
            "messages": messages.iter().map(Self::convert_message).collect::<Vec<_>>(),
        });

        if !tools.is_empty() {
            body["tools"] = tools
                .iter()
                .map(|t| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.to_json_schema(),
                        }
                    })
                })
                .collect();
            body["tool_choice"] = json!(match options.tool_choice {
                ToolChoice::Auto => "auto",
                ToolChoice::None => "none",
                ToolChoice::Required => "required",
            });
        }
        if let Some(temperature) = options.temperature {
            body["temperature"] = json!(temperature);
        }
        if let Some(max_tokens) = options.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        body
    }

    /// Convert an agent message to the wire format
    fn convert_message(message: &Message) -> Value {
        match message.role {
            Role::Tool => json!({
                "role": "tool",
                "tool_call_id": message.tool_call_id,
                "content": message.content,
            }),
            Role::Assistant if !message.tool_calls.is_empty() => json!({
                "role": "assistant",
                "content": if message.content.is_empty() { Value::Null } else { json!(message.content) },
                "tool_calls": message.tool_calls.iter().map(|c| json!({
                    "id": c.id,
                    "type": "function",
                    "function": {
                        "name": c.name,
                        "arguments": Value::Object(c.arguments.clone()).to_string(),
                    }
                })).collect::<Vec<_>>(),
            }),
            role => json!({
                "role": role.to_string(),
                "content": message.content,
            }),
        }
    }

    /// Convert the response body to a completion
    fn parse_completion(model_id: &str, body: &Value) -> Result<Completion> {
        let choice = body
            .pointer("/choices/0")
            .ok_or_else(|| AgentError::Parse("OpenAI response has no choices".into()))?;
        let message = choice.get("message").unwrap_or(&Value::Null);

        let tool_calls = message
            .get("tool_calls")
            .and_then(Value::as_array)
            .map(|calls| calls.iter().map(Self::parse_tool_call).collect::<Result<Vec<_>>>())
            .transpose()?
            .unwrap_or_default();

        let usage = body.get("usage").map_or_else(TokenUsage::default, |u| {
            TokenUsage::new(read_u32(u, "prompt_tokens"), read_u32(u, "completion_tokens"))
        });

        let finish_reason = choice
            .get("finish_reason")
            .and_then(Value::as_str)
            .map(|reason| match reason {
                "length" => FinishReason::Length,
                "tool_calls" | "function_call" => FinishReason::ToolUse,
                "content_filter" => FinishReason::ContentFilter,
                _ => FinishReason::Stop,
            });

        Ok(Completion {
            content: message
                .get("content")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            tool_calls,
            model: body
                .get("model")
                .and_then(Value::as_str)
                .unwrap_or(model_id)
                .to_string(),
            usage,
            finish_reason,
        })
    }

    fn parse_tool_call(call: &Value) -> Result<ToolCall> {
        let name = call
            .pointer("/function/name")
            .and_then(Value::as_str)
            .ok_or_else(|| AgentError::Parse("OpenAI tool call without a function name".into()))?;
        let raw_args = call
            .pointer("/function/arguments")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let arguments = parse_arguments(name, raw_args)?;

        Ok(match call.get("id").and_then(Value::as_str) {
            Some(id) => ToolCall::new(id, name, arguments),
            None => ToolCall::with_generated_id(name, arguments),
        })
    }
}

/// Arguments arrive as a JSON-encoded string
fn parse_arguments(tool: &str, raw: &str) -> Result<Map<String, Value>> {
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(AgentError::Parse(format!(
            "Arguments for tool '{tool}' must be an object, got {other}"
        ))),
        Err(e) => Err(AgentError::Parse(format!("Malformed arguments for tool '{tool}': {e}"))),
    }
}

fn read_u32(value: &Value, key: &str) -> u32 {
    value
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0)
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    fn provider(&self) -> &str {
        ProviderName::OpenAi.as_str()
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn generate(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let body = Self::request_body(&self.model_id, messages, tools, options);

        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body);
        if let Some(org) = &self.organization {
            request = request.header("OpenAI-Organization", org);
        }
        for (name, value) in &self.headers {
            request = request.header(name, value);
        }

        tracing::debug!(model = %self.model_id, messages = messages.len(), tools = tools.len(), "OpenAI request");
        let response = http::send_json(ProviderName::OpenAi.as_str(), request).await?;
        Self::parse_completion(&self.model_id, &response)
    }
}
