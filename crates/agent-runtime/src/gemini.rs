//! Google Gemini Binding
//!
//! Implementation of `LanguageModel` over the `generateContent` REST endpoint.
//! Gemini does not assign call IDs, so one is generated per function call and
//! tool results are paired back by name.

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

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini model
pub struct GeminiModel {
    client: reqwest::Client,
    model_id: String,
    api_key: String,
    base_url: String,
}

impl GeminiModel {
    pub fn new(model_id: impl Into<String>, config: &ProviderConfig) -> Result<Self> {
        let api_key = ProviderConfig::require(config.api_key.as_ref(), ProviderName::Gemini, "GEMINI_API_KEY")?;
        Ok(Self {
            client: reqwest::Client::new(),
            model_id: model_id.into(),
            api_key,
            base_url: http::trim_base_url(config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)),
        })
    }

    fn request_body(messages: &[Message], tools: &[ToolSchema], options: &GenerationOptions) -> Value {
        let mut system = Vec::new();
        let mut contents: Vec<Value> = Vec::new();

        for message in messages {
            let (role, parts) = match message.role {
                Role::System => {
                    system.push(message.content.as_str());
                    continue;
                }
                Role::User => ("user", vec![json!({"text": message.content})]),
                Role::Assistant => {
                    let mut parts = Vec::new();
                    if !message.content.is_empty() {
                        parts.push(json!({"text": message.content}));
                    }
                    parts.extend(message.tool_calls.iter().map(|c| {
                        json!({"functionCall": {"name": c.name, "args": Value::Object(c.arguments.clone())}})
                    }));
                    ("model", parts)
                }
                Role::Tool => (
                    "user",
                    vec![json!({
                        "functionResponse": {
                            "name": message.name.as_deref().unwrap_or_default(),
                            "response": {"content": message.content},
                        }
                    })],
                ),
            };

            // Consecutive turns of the same role are merged
            match contents.last_mut() {
                Some(last) if last["role"] == role => {
                    if let Some(existing) = last["parts"].as_array_mut() {
                        existing.extend(parts);
                    }
                }
                _ => contents.push(json!({"role": role, "parts": parts})),
            }
        }

        let mut body = json!({ "contents": contents });

        if !system.is_empty() {
            body["systemInstruction"] = json!({"parts": [{"text": system.join("\n\n")}]});
        }
        if !tools.is_empty() {
            let declarations: Vec<Value> = tools.iter().map(Self::declaration).collect();
            body["tools"] = json!([{ "functionDeclarations": declarations }]);
            body["toolConfig"] = json!({
                "functionCallingConfig": {
                    "mode": match options.tool_choice {
                        ToolChoice::Auto => "AUTO",
                        ToolChoice::None => "NONE",
                        ToolChoice::Required => "ANY",
                    }
                }
            });
        }

        let mut generation = Map::new();
        if let Some(temperature) = options.temperature {
            generation.insert("temperature".into(), json!(temperature));
        }
        if let Some(max_tokens) = options.max_tokens {
            generation.insert("maxOutputTokens".into(), json!(max_tokens));
        }
        if !generation.is_empty() {
            body["generationConfig"] = Value::Object(generation);
        }
        body
    }

    /// Gemini rejects an empty `properties` object, so parameterless tools
    /// omit `parameters` entirely.
    fn declaration(schema: &ToolSchema) -> Value {
        let mut decl = json!({
            "name": schema.name,
            "description": schema.description,
        });
        if !schema.parameters.is_empty() {
            decl["parameters"] = schema.to_json_schema();
        }
        decl
    }

    fn parse_completion(model_id: &str, body: &Value) -> Result<Completion> {
        let candidate = body.pointer("/candidates/0").ok_or_else(|| {
            let reason = body
                .pointer("/promptFeedback/blockReason")
                .and_then(Value::as_str)
                .unwrap_or("no candidates returned");
            AgentError::Provider(format!("Gemini returned no response: {reason}"))
        })?;

        let mut content = String::new();
        let mut tool_calls = Vec::new();
        let parts = candidate
            .pointer("/content/parts")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for part in parts {
            if let Some(text) = part.get("text").and_then(Value::as_str) {
                content.push_str(text);
            }
            if let Some(call) = part.get("functionCall") {
                let name = call
                    .get("name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| AgentError::Parse("Gemini function call without a name".into()))?;
                let arguments = match call.get("args") {
                    Some(Value::Object(args)) => args.clone(),
                    None | Some(Value::Null) => Map::new(),
                    Some(other) => {
                        return Err(AgentError::Parse(format!(
                            "Arguments for tool '{name}' must be an object, got {other}"
                        )));
                    }
                };
                tool_calls.push(ToolCall::with_generated_id(name, arguments));
            }
        }

        let finish_reason = candidate
            .get("finishReason")
            .and_then(Value::as_str)
            .map(|reason| match reason {
                "MAX_TOKENS" => FinishReason::Length,
                "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" => FinishReason::ContentFilter,
                _ if !tool_calls.is_empty() => FinishReason::ToolUse,
                _ => FinishReason::Stop,
            });

        let usage = body.get("usageMetadata").map_or_else(TokenUsage::default, |u| {
            TokenUsage::new(read_u32(u, "promptTokenCount"), read_u32(u, "candidatesTokenCount"))
        });

        Ok(Completion {
            content,
            tool_calls,
            model: body
                .get("modelVersion")
                .and_then(Value::as_str)
                .unwrap_or(model_id)
                .to_string(),
            usage,
            finish_reason,
        })
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
impl LanguageModel for GeminiModel {
    fn provider(&self) -> &str {
        ProviderName::Gemini.as_str()
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
        let body = Self::request_body(messages, tools, options);
        let request = self
            .client
            .post(format!("{}/models/{}:generateContent", self.base_url, self.model_id))
            .header("x-goog-api-key", &self.api_key)
            .json(&body);

        tracing::debug!(model = %self.model_id, messages = messages.len(), tools = tools.len(), "Gemini request");
        let response = http::send_json(ProviderName::Gemini.as_str(), request).await?;
        Self::parse_completion(&self.model_id, &response)
    }
}
