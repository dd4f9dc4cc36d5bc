//! A local fake model for testing purpose.
//!
//! [`ScriptedModel`] answers each `generate` call with the next turn of its
//! script and records every request it receives, so tests can assert on
//! both the agent's result and what the model was shown.

use std::collections::VecDeque;
use std::sync::Mutex;

use agent_core::model::{Completion, FinishReason, GenerationOptions, LanguageModel, TokenUsage};
use agent_core::{AgentError, Message, Result, ToolCall, ToolSchema};
use async_trait::async_trait;
use serde_json::{Map, Value};

/// One scripted response
#[derive(Clone, Debug)]
enum Turn {
    Respond(Completion),
    Fail(String),
    RateLimited(String),
}

/// A request the model received
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub messages: Vec<Message>,
    pub tool_names: Vec<String>,
    pub options: GenerationOptions,
}

/// A local fake model for testing purpose.
///
/// Before sending requests, set up the script, which is how the model should
/// respond to consecutive requests. When the script runs out every further
/// request fails.
///
/// # Note
///
/// This type copies every request it sees. Only use it in tests.
pub struct ScriptedModel {
    model_id: String,
    usage_per_turn: TokenUsage,
    script: Mutex<VecDeque<Turn>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedModel {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            usage_per_turn: TokenUsage::new(10, 5),
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Usage reported with every successful turn
    #[must_use]
    pub const fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage_per_turn = usage;
        self
    }

    /// Respond with plain text and no tool calls
    #[must_use]
    pub fn then_text(self, text: impl Into<String>) -> Self {
        let completion = self.completion(text.into(), Vec::new());
        self.push(Turn::Respond(completion))
    }

    /// Respond with a single tool call
    ///
    /// # Panics
    ///
    /// Panics if `arguments` is not a JSON object.
    #[must_use]
    pub fn then_tool_call(self, text: impl Into<String>, tool: &str, arguments: Value) -> Self {
        let Value::Object(arguments) = arguments else {
            panic!("tool call arguments must be a JSON object");
        };
        let id = format!("call_{}", self.script_len() + 1);
        self.then_tool_calls(text, vec![ToolCall::new(id, tool, arguments)])
    }

    /// Respond with several tool calls in one turn
    #[must_use]
    pub fn then_tool_calls(self, text: impl Into<String>, calls: Vec<ToolCall>) -> Self {
        let completion = self.completion(text.into(), calls);
        self.push(Turn::Respond(completion))
    }

    /// Fail the request with `message` as the error text
    #[must_use]
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.push(Turn::Fail(message.into()))
    }

    /// Fail the request with a retryable rate-limit error
    #[must_use]
    pub fn then_rate_limited(self, message: impl Into<String>) -> Self {
        self.push(Turn::RateLimited(message.into()))
    }

    /// Requests received so far
    ///
    /// # Panics
    ///
    /// Panics if the lock was poisoned by a panicking test.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn completion(&self, content: String, tool_calls: Vec<ToolCall>) -> Completion {
        let finish_reason = if tool_calls.is_empty() {
            FinishReason::Stop
        } else {
            FinishReason::ToolUse
        };
        Completion {
            content,
            tool_calls,
            model: self.model_id.clone(),
            usage: self.usage_per_turn,
            finish_reason: Some(finish_reason),
        }
    }

    fn push(self, turn: Turn) -> Self {
        self.script.lock().unwrap().push_back(turn);
        self
    }

    fn script_len(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

/// Arguments object helper for building tool calls in tests
pub fn args(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn provider(&self) -> &str {
        "scripted"
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
        self.requests.lock().unwrap().push(RecordedRequest {
            messages: messages.to_vec(),
            tool_names: tools.iter().map(|t| t.name.clone()).collect(),
            options: options.clone(),
        });

        match self.script.lock().unwrap().pop_front() {
            Some(Turn::Respond(completion)) => Ok(completion),
            Some(Turn::Fail(message)) => Err(AgentError::Other(message)),
            Some(Turn::RateLimited(message)) => Err(AgentError::RateLimited(message)),
            None => Err(AgentError::Provider("no enough steps in script".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_replays_script_in_order() {
        let model = ScriptedModel::new("test")
            .then_tool_call("", "weather", json!({"location": "Boston"}))
            .then_text("Sunny")
            .then_fail("rate limited");
        let opts = GenerationOptions::default();

        let first = model.generate(&[], &[], &opts).await.unwrap();
        assert_eq!(first.tool_calls[0].name, "weather");
        assert_eq!(first.tool_calls[0].id, "call_1");
        assert_eq!(first.finish_reason, Some(FinishReason::ToolUse));

        let second = model.generate(&[], &[], &opts).await.unwrap();
        assert_eq!(second.content, "Sunny");

        let third = model.generate(&[], &[], &opts).await.unwrap_err();
        assert_eq!(third.to_string(), "rate limited");
        assert!(!third.is_retryable());

        assert!(model.generate(&[], &[], &opts).await.is_err());
        assert_eq!(model.requests().len(), 4);
    }
}
