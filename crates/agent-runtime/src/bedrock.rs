//! AWS Bedrock Binding
//!
//! Implementation of `LanguageModel` over the Bedrock runtime Converse API,
//! signed with SigV4.

use agent_core::{
    error::{AgentError, Result},
    message::{Message, Role},
    model::{Completion, FinishReason, GenerationOptions, LanguageModel, TokenUsage, ToolChoice},
    tool::{ToolCall, ToolSchema},
};
use async_trait::async_trait;
use reqwest::Url;
use serde_json::{Map, Value, json};

use crate::config::{ProviderConfig, ProviderName};
use crate::http;
use crate::sigv4::{self, Credentials, SignableRequest};

pub const DEFAULT_REGION: &str = "us-east-1";
const SIGNING_SERVICE: &str = "bedrock";

/// Bedrock model
pub struct BedrockModel {
    client: reqwest::Client,
    model_id: String,
    region: String,
    base_url: String,
    credentials: Credentials,
}

impl BedrockModel {
    pub fn new(model_id: impl Into<String>, config: &ProviderConfig) -> Result<Self> {
        let access_key_id =
            ProviderConfig::require(config.access_key_id.as_ref(), ProviderName::Bedrock, "AWS_ACCESS_KEY_ID")?;
        let secret_access_key = ProviderConfig::require(
            config.secret_access_key.as_ref(),
            ProviderName::Bedrock,
            "AWS_SECRET_ACCESS_KEY",
        )?;
        let region = config
            .region
            .clone()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        let base_url = config
            .base_url
            .as_deref()
            .map_or_else(|| format!("https://bedrock-runtime.{region}.amazonaws.com"), http::trim_base_url);

        Ok(Self {
            client: reqwest::Client::new(),
            model_id: model_id.into(),
            region,
            base_url,
            credentials: Credentials {
                access_key_id,
                secret_access_key,
                session_token: config.session_token.clone(),
            },
        })
    }

    fn endpoint(&self) -> Result<Url> {
        let url = format!(
            "{}/model/{}/converse",
            self.base_url,
            sigv4::uri_encode(&self.model_id, true)
        );
        Url::parse(&url).map_err(|e| AgentError::Config(format!("Invalid Bedrock endpoint '{url}': {e}")))
    }

    fn request_body(messages: &[Message], tools: &[ToolSchema], options: &GenerationOptions) -> Value {
        let mut system = Vec::new();
        let mut turns: Vec<Value> = Vec::new();

        for message in messages {
            let (role, blocks) = match message.role {
                Role::System => {
                    system.push(json!({"text": message.content}));
                    continue;
                }
                Role::User => ("user", vec![json!({"text": message.content})]),
                Role::Assistant => {
                    let mut blocks = Vec::new();
                    if !message.content.is_empty() {
                        blocks.push(json!({"text": message.content}));
                    }
                    blocks.extend(message.tool_calls.iter().map(|c| {
                        json!({"toolUse": {
                            "toolUseId": c.id,
                            "name": c.name,
                            "input": Value::Object(c.arguments.clone()),
                        }})
                    }));
                    ("assistant", blocks)
                }
                Role::Tool => (
                    "user",
                    vec![json!({"toolResult": {
                        "toolUseId": message.tool_call_id.as_deref().unwrap_or_default(),
                        "content": [{"text": message.content}],
                    }})],
                ),
            };

            // Converse requires alternating roles
            match turns.last_mut() {
                Some(last) if last["role"] == role => {
                    if let Some(existing) = last["content"].as_array_mut() {
                        existing.extend(blocks);
                    }
                }
                _ => turns.push(json!({"role": role, "content": blocks})),
            }
        }

        let mut body = json!({ "messages": turns });
        if !system.is_empty() {
            body["system"] = Value::Array(system);
        }

        if !tools.is_empty() {
            let specs: Vec<Value> = tools
                .iter()
                .map(|t| {
                    json!({"toolSpec": {
                        "name": t.name,
                        "description": t.description,
                        "inputSchema": {"json": t.to_json_schema()},
                    }})
                })
                .collect();
            let mut tool_config = json!({ "tools": specs });
            match options.tool_choice {
                ToolChoice::Auto => tool_config["toolChoice"] = json!({"auto": {}}),
                ToolChoice::Required => tool_config["toolChoice"] = json!({"any": {}}),
                ToolChoice::None => {}
            }
            body["toolConfig"] = tool_config;
        }

        let mut inference = Map::new();
        if let Some(max_tokens) = options.max_tokens {
            inference.insert("maxTokens".into(), json!(max_tokens));
        }
        if let Some(temperature) = options.temperature {
            inference.insert("temperature".into(), json!(temperature));
        }
        if !inference.is_empty() {
            body["inferenceConfig"] = Value::Object(inference);
        }
        body
    }

    fn parse_completion(model_id: &str, body: &Value) -> Result<Completion> {
        let blocks = body
            .pointer("/output/message/content")
            .and_then(Value::as_array)
            .ok_or_else(|| AgentError::Parse("Bedrock response has no output message".into()))?;

        let mut content = String::new();
        let mut tool_calls = Vec::new();
        for block in blocks {
            if let Some(text) = block.get("text").and_then(Value::as_str) {
                content.push_str(text);
            }
            if let Some(tool_use) = block.get("toolUse") {
                let name = tool_use
                    .get("name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| AgentError::Parse("Bedrock toolUse block without a name".into()))?;
                let arguments = match tool_use.get("input") {
                    Some(Value::Object(input)) => input.clone(),
                    None | Some(Value::Null) => Map::new(),
                    Some(other) => {
                        return Err(AgentError::Parse(format!(
                            "Arguments for tool '{name}' must be an object, got {other}"
                        )));
                    }
                };
                tool_calls.push(match tool_use.get("toolUseId").and_then(Value::as_str) {
                    Some(id) => ToolCall::new(id, name, arguments),
                    None => ToolCall::with_generated_id(name, arguments),
                });
            }
        }

        let finish_reason = body
            .get("stopReason")
            .and_then(Value::as_str)
            .map(|reason| match reason {
                "tool_use" => FinishReason::ToolUse,
                "max_tokens" => FinishReason::Length,
                "content_filtered" | "guardrail_intervened" => FinishReason::ContentFilter,
                _ => FinishReason::Stop,
            });

        let usage = body.get("usage").map_or_else(TokenUsage::default, |u| {
            let read = |key: &str| {
                u.get(key)
                    .and_then(Value::as_u64)
                    .and_then(|n| u32::try_from(n).ok())
                    .unwrap_or(0)
            };
            TokenUsage::new(read("inputTokens"), read("outputTokens"))
        });

        Ok(Completion {
            content,
            tool_calls,
            model: model_id.to_string(),
            usage,
            finish_reason,
        })
    }
}

#[async_trait]
impl LanguageModel for BedrockModel {
    fn provider(&self) -> &str {
        ProviderName::Bedrock.as_str()
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
        let body = serde_json::to_vec(&Self::request_body(messages, tools, options))?;
        let url = self.endpoint()?;
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => return Err(AgentError::Config(format!("Bedrock endpoint has no host: {url}"))),
        };

        let signed = sigv4::sign(
            &SignableRequest {
                method: "POST",
                host: &host,
                path: url.path(),
                headers: &[("content-type", "application/json")],
                body: &body,
            },
            &self.credentials,
            &self.region,
            SIGNING_SERVICE,
            chrono::Utc::now(),
        )?;

        let mut request = self
            .client
            .post(url.clone())
            .header("content-type", "application/json")
            .body(body);
        for (name, value) in signed {
            request = request.header(name, value);
        }

        tracing::debug!(model = %self.model_id, region = %self.region, messages = messages.len(), "Bedrock request");
        let response = http::send_json(ProviderName::Bedrock.as_str(), request).await?;
        Self::parse_completion(&self.model_id, &response)
    }
}
